//! Error types for density resolution
//!
//! Every stage of a resolution returns [`ResolveResult`]. Only the sentinel
//! substitution on bad model output is masked; everything else surfaces here.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type ResolveResult<T> = Result<T, DensityError>;

#[derive(Debug, Error)]
pub enum DensityError {
    #[error("Malformed epoch '{epoch}': {message}")]
    EpochFormat { epoch: String, message: String },

    #[error("Month {month} not found in {table} table")]
    LookupTable { month: u32, table: &'static str },

    #[error("No {index} record matches key '{key}'")]
    IndexNotFound { index: &'static str, key: String },

    #[error("Parse failed: {message}")]
    Parse { message: String },

    #[error("Failed to run density model '{program}': {message}")]
    ModelInvocation { program: PathBuf, message: String },

    #[error("Density model '{program}' did not finish within {timeout:?}")]
    ModelTimeout { program: PathBuf, timeout: Duration },

    #[error("Malformed density output '{raw}': {message}")]
    MalformedDensity { raw: String, message: String },

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl DensityError {
    pub fn epoch_format(epoch: &str, message: impl Into<String>) -> Self {
        Self::EpochFormat {
            epoch: epoch.to_string(),
            message: message.into(),
        }
    }

    pub fn index_not_found(index: &'static str, key: impl Into<String>) -> Self {
        Self::IndexNotFound {
            index,
            key: key.into(),
        }
    }

    pub fn parsing_error(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn model_invocation(program: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ModelInvocation {
            program: program.into(),
            message: message.into(),
        }
    }

    pub fn malformed_density(raw: &str, message: impl Into<String>) -> Self {
        Self::MalformedDensity {
            raw: raw.to_string(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
