//! Atmospheric density for drag calculations
//!
//! The density itself comes from an external NRLMSISE-00 executable. This
//! module owns everything around that call: building the request, running
//! the model, and turning its text output into an SI density.
//!
//! # Pipeline
//!
//! - **Epoch**: datestamp → calendar fields → day-of-year
//! - **Space weather**: F10.7, F10.7A and daily Ap from historical records
//! - **Model**: [`DensityModel`] invoked with ten positional arguments
//! - **Normalization**: g/cm³ text → kg/m³, sentinel on bad output
//!
//! [`DragDensityResolver`] runs the whole pipeline.

mod normalize;
mod nrlmsise00;
mod resolver;

pub use normalize::{DensityResultNormalizer, SENTINEL_DENSITY};
pub use nrlmsise00::{truncate_field, ModelRequest, Nrlmsise00Process, RAW_OUTPUT_LIMIT};
pub use resolver::{DragDensityResolver, Resolution, MIN_MODEL_ALTITUDE_KM};

use crate::errors::ResolveResult;
use serde::{Deserialize, Serialize};

/// Output of a density resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AtmosphereDensity {
    /// Total atmospheric mass density in kg/m³
    pub rho: f64,

    /// True when the model output was unusable and the sentinel was used
    pub substituted: bool,
}

impl AtmosphereDensity {
    /// Density read from the model
    pub fn new(rho: f64) -> Self {
        Self {
            rho,
            substituted: false,
        }
    }

    /// Fallback density standing in for unusable model output
    pub fn sentinel(rho: f64) -> Self {
        Self {
            rho,
            substituted: true,
        }
    }
}

/// Geodetic position of the spacecraft
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPosition {
    /// Geodetic latitude, degrees
    pub latitude_deg: f64,
    /// Longitude, degrees east
    pub longitude_deg: f64,
    /// Height above the ellipsoid, km
    pub altitude_km: f64,
}

impl GeodeticPosition {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_km: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_km,
        }
    }
}

/// External density model boundary
///
/// Implementations return the model's raw text; unit conversion happens in
/// [`DensityResultNormalizer`].
pub trait DensityModel: Send + Sync {
    /// Run the model once and return its raw output text
    fn invoke(&self, request: &ModelRequest) -> ResolveResult<String>;

    /// Model name for logging and display
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        "External atmospheric density model"
    }
}
