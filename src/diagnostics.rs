//! Non-fatal conditions reported back to the simulation
//!
//! The host owns the sink. Nothing reported here stops a resolution.

use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Model output was non-finite or unreadable; the sentinel density was used
    SentinelSubstituted { raw: String, density: f64 },
    /// Position is below the altitude the model is valid for
    AltitudeTooLow { altitude_km: f64 },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SentinelSubstituted { raw, density } => write!(
                f,
                "{:.3e} substituted for density value '{}' returned by nrlmsise",
                density, raw
            ),
            Self::AltitudeTooLow { altitude_km } => {
                write!(f, "Force_drag: Altitude too low, {:.16} km.", altitude_km)
            }
        }
    }
}

/// Receiver for [`Diagnostic`]s
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Sink that only writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
    }
}

/// Sink that logs and keeps every diagnostic until drained
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: Mutex<Vec<Diagnostic>>,
}

impl DiagnosticLog {
    /// Empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded diagnostics not yet drained
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copy of the recorded diagnostics, oldest first
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    /// Take the recorded diagnostics, leaving the log empty
    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock())
    }
}

impl DiagnosticSink for DiagnosticLog {
    fn report(&self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.entries.lock().push(diagnostic);
    }
}
