//! Atmospheric density for drag, from space-weather records and NRLMSISE-00
//!
//! A resolution decomposes a UTC datestamp, finds the day-of-year, looks up
//! F10.7, F10.7A and daily Ap in historical record files, runs the external
//! NRLMSISE-00 driver and converts its g/cm³ output to kg/m³.
//!
//! ```no_run
//! use spacedb_density::{GeodeticPosition, ResolverSettings};
//!
//! # fn main() -> Result<(), spacedb_density::DensityError> {
//! let resolver = ResolverSettings::load("density.json")?.build()?;
//! let density = resolver.resolve(
//!     "15/03/2020 12:30:45.000000 UTC",
//!     &GeodeticPosition::new(51.5, -0.1278, 400.0),
//! )?;
//! println!("{:e} kg/m³", density.rho);
//! # Ok(())
//! # }
//! ```

pub mod atmosphere;
pub mod diagnostics;
pub mod epoch;
pub mod errors;
pub mod forces;
pub mod settings;
pub mod space_weather;

pub use atmosphere::{
    AtmosphereDensity, DensityModel, DensityResultNormalizer, DragDensityResolver,
    GeodeticPosition, ModelRequest, Nrlmsise00Process, Resolution,
};
pub use diagnostics::{Diagnostic, DiagnosticLog, DiagnosticSink, LogSink};
pub use epoch::{DayOfYearCalculator, DayOfYearInfo, Epoch};
pub use errors::{DensityError, ResolveResult};
pub use forces::{AtmosphericDrag, DragAcceleration, DragState};
pub use settings::ResolverSettings;
pub use space_weather::{SpaceWeatherIndexStore, SpaceWeatherIndices};
