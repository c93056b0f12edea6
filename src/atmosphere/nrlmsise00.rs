//! NRLMSISE-00 density model run as an external process
//!
//! NRLMSISE-00 (Naval Research Laboratory Mass Spectrometer and Incoherent
//! Scatter Radar) is the standard empirical atmosphere model for satellite
//! drag calculations. Here it is a separately built test driver taking ten
//! positional arguments and printing a single density in g/cm³.
//!
//! # Invocation
//!
//! ```text
//! <program> <doy> <year> <sec> <alt> <lat> <lon> 0 <f107> <f107a> <ap>
//! ```
//!
//! The child runs inside the model's installation directory; the host's own
//! working directory is never touched. Invocations are still serialized
//! process-wide because the driver may write scratch files next to itself.

use super::{DensityModel, GeodeticPosition};
use crate::epoch::{DayOfYearInfo, Epoch};
use crate::errors::{DensityError, ResolveResult};
use crate::space_weather::SpaceWeatherIndices;
use parking_lot::{const_mutex, Mutex};
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Bytes of the first output line kept as the raw result
pub const RAW_OUTPUT_LIMIT: usize = 24;

/// Width the model reads latitude, longitude and altitude at
const FIELD_WIDTH: usize = 8;

/// Fixed seventh argument of the driver
const MODEL_FLAG: &str = "0";

const POLL_INTERVAL: Duration = Duration::from_millis(5);

static MODEL_LOCK: Mutex<()> = const_mutex(());

/// Render a coordinate the way the model expects it
///
/// Fixed 15-decimal rendering cut to 8 characters: `51.5` → `51.50000`,
/// `-0.1278` → `-0.12780`.
pub fn truncate_field(value: f64) -> String {
    let mut text = format!("{:.15}", value);
    text.truncate(FIELD_WIDTH.min(text.len()));
    text
}

/// Positional arguments of one model run
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub day_of_year: u32,
    pub year: i32,
    /// Seconds since midnight UTC
    pub second_of_day: u32,
    /// km, truncated to the model's field width
    pub altitude: String,
    /// Degrees, truncated to the model's field width
    pub latitude: String,
    /// Degrees, truncated to the model's field width
    pub longitude: String,
    /// F10.7 of the previous day
    pub f107: f64,
    /// 81-day mean F10.7
    pub f107a: f64,
    /// Daily Ap
    pub ap: i32,
}

impl ModelRequest {
    /// Collect the arguments for one epoch, position and set of indices
    pub fn new(
        epoch: &Epoch,
        day: &DayOfYearInfo,
        position: &GeodeticPosition,
        indices: &SpaceWeatherIndices,
    ) -> Self {
        Self {
            day_of_year: day.day_of_year,
            year: epoch.year,
            second_of_day: epoch.second_of_day,
            altitude: truncate_field(position.altitude_km),
            latitude: truncate_field(position.latitude_deg),
            longitude: truncate_field(position.longitude_deg),
            f107: indices.f107,
            f107a: indices.f107a,
            ap: indices.ap,
        }
    }

    /// The ten arguments, in the order the driver reads them
    pub fn args(&self) -> Vec<String> {
        vec![
            self.day_of_year.to_string(),
            self.year.to_string(),
            self.second_of_day.to_string(),
            self.altitude.clone(),
            self.latitude.clone(),
            self.longitude.clone(),
            MODEL_FLAG.to_string(),
            self.f107.to_string(),
            self.f107a.to_string(),
            self.ap.to_string(),
        ]
    }
}

/// NRLMSISE-00 driver executable
#[derive(Debug, Clone)]
pub struct Nrlmsise00Process {
    /// Driver executable
    program: PathBuf,

    /// Directory the driver runs in
    working_dir: PathBuf,

    /// Bound on a single run, from spawn to the first output line
    timeout: Duration,
}

impl Nrlmsise00Process {
    /// Create a driver handle; nothing is checked until the first run
    pub fn new(program: impl Into<PathBuf>, working_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            working_dir: working_dir.into(),
            timeout,
        }
    }

    /// Path of the driver executable
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Directory the driver runs in
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Bound on a single run
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn run(&self, request: &ModelRequest) -> ResolveResult<String> {
        let deadline = Instant::now() + self.timeout;
        let mut child = Command::new(&self.program)
            .args(request.args())
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| DensityError::model_invocation(&self.program, e.to_string()))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            DensityError::model_invocation(&self.program, "stdout was not captured")
        })?;

        // The first line is sent as soon as it is read; the rest is discarded
        // so a chatty model cannot fill the pipe and stall
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            let mut reader = BufReader::new(stdout);
            let mut line = Vec::with_capacity(RAW_OUTPUT_LIMIT);
            let first = (&mut reader)
                .take(RAW_OUTPUT_LIMIT as u64)
                .read_until(b'\n', &mut line)
                .map(|_| line);
            let _ = sender.send(first);
            let _ = io::copy(&mut reader, &mut io::sink());
        });

        let status = match wait_until(&mut child, deadline)
            .map_err(|e| DensityError::model_invocation(&self.program, e.to_string()))?
        {
            Some(status) => status,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(self.timed_out());
            }
        };

        // A process left behind by the model can hold stdout open after exit
        let output = match receiver.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(output) => {
                output.map_err(|e| DensityError::model_invocation(&self.program, e.to_string()))?
            }
            Err(RecvTimeoutError::Timeout) => return Err(self.timed_out()),
            Err(RecvTimeoutError::Disconnected) => {
                return Err(DensityError::model_invocation(
                    &self.program,
                    "output reader stopped",
                ))
            }
        };

        if !status.success() {
            return Err(DensityError::model_invocation(
                &self.program,
                format!("exited with {}", status),
            ));
        }

        Ok(first_line(&output))
    }

    fn timed_out(&self) -> DensityError {
        DensityError::ModelTimeout {
            program: self.program.clone(),
            timeout: self.timeout,
        }
    }
}

impl DensityModel for Nrlmsise00Process {
    fn invoke(&self, request: &ModelRequest) -> ResolveResult<String> {
        let _guard = MODEL_LOCK.lock();
        log::debug!(
            "Running {:?} in {:?} with {:?}",
            self.program,
            self.working_dir,
            request.args()
        );

        let started = Instant::now();
        let raw = self.run(request)?;
        log::debug!("Model returned '{}' in {:?}", raw, started.elapsed());
        Ok(raw)
    }

    fn name(&self) -> &'static str {
        "NRLMSISE-00"
    }

    fn description(&self) -> &'static str {
        "NRL Mass Spectrometer and Incoherent Scatter Radar Exosphere 2000"
    }
}

/// `Ok(None)` when the deadline passes first
fn wait_until(child: &mut Child, deadline: Instant) -> io::Result<Option<ExitStatus>> {
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }

        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(deadline - now));
    }
}

/// First output line, trailing whitespace removed, at most [`RAW_OUTPUT_LIMIT`] bytes
fn first_line(output: &[u8]) -> String {
    let text = String::from_utf8_lossy(output);
    let line = text.lines().next().unwrap_or("").trim_end();

    let mut end = line.len().min(RAW_OUTPUT_LIMIT);
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    line[..end].to_string()
}
