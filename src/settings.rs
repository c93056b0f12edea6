//! Resolver configuration

use crate::atmosphere::{
    DensityResultNormalizer, DragDensityResolver, Nrlmsise00Process, SENTINEL_DENSITY,
};
use crate::epoch::{DayOfYearCalculator, DEFAULT_LEAP_YEARS};
use crate::errors::{DensityError, ResolveResult};
use crate::space_weather::{open_records, SpaceWeatherIndexStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the model and record files live, and how to treat their output
///
/// Every field has a default, so a settings file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Density model executable
    pub model_program: PathBuf,
    /// Directory the model runs in
    pub model_dir: PathBuf,
    /// SOLFSMY-style F10.7 records
    pub solar_flux_path: PathBuf,
    /// apindex-style Ap records
    pub geomagnetic_path: PathBuf,
    /// Keep record files in memory instead of re-reading them per call
    pub cache_records: bool,
    /// Bound on one model run, seconds
    pub timeout_secs: f64,
    /// Substituted for unusable model output, kg/m³
    pub sentinel_density: f64,
    /// Fixed character index of the exponent marker in the model output
    pub marker_column: Option<usize>,
    /// Years that use the leap-year table
    pub leap_years: Vec<i32>,
    /// Extend both day tables to December
    pub include_december: bool,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            model_program: PathBuf::from("nrlmsise_test01"),
            model_dir: PathBuf::from("."),
            solar_flux_path: PathBuf::from("SOLFSMY.TXT"),
            geomagnetic_path: PathBuf::from("apindex"),
            cache_records: true,
            timeout_secs: 30.0,
            sentinel_density: SENTINEL_DENSITY,
            marker_column: None,
            leap_years: DEFAULT_LEAP_YEARS.to_vec(),
            include_december: false,
        }
    }
}

impl ResolverSettings {
    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> ResolveResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| DensityError::io(path, e))?;
        let settings: Self = serde_json::from_str(&text)
            .map_err(|e| DensityError::config(format!("{}: {}", path.display(), e)))?;

        settings.validate()?;
        log::info!("Loaded resolver settings from {:?}", path);
        Ok(settings)
    }

    /// Reject values no resolver can run with
    pub fn validate(&self) -> ResolveResult<()> {
        if !(self.timeout_secs.is_finite() && self.timeout_secs > 0.0) {
            return Err(DensityError::config(format!(
                "timeout_secs must be positive, got {}",
                self.timeout_secs
            )));
        }
        if !(self.sentinel_density.is_finite() && self.sentinel_density > 0.0) {
            return Err(DensityError::config(format!(
                "sentinel_density must be positive, got {}",
                self.sentinel_density
            )));
        }
        Ok(())
    }

    /// Model timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }

    /// `model_dir` as an absolute path, relative ones taken from the current directory
    ///
    /// The child starts inside this directory, so a relative program path
    /// must not be resolved against it a second time.
    pub fn absolute_model_dir(&self) -> ResolveResult<PathBuf> {
        let cwd = std::env::current_dir().map_err(|e| DensityError::io(&self.model_dir, e))?;
        Ok(self.model_dir_from(&cwd))
    }

    /// The model program, resolved against the absolute `model_dir` when relative
    pub fn model_path(&self) -> ResolveResult<PathBuf> {
        Ok(self.program_in(&self.absolute_model_dir()?))
    }

    fn model_dir_from(&self, base: &Path) -> PathBuf {
        if self.model_dir.is_absolute() {
            self.model_dir.clone()
        } else {
            base.join(&self.model_dir)
        }
    }

    fn program_in(&self, model_dir: &Path) -> PathBuf {
        if self.model_program.is_absolute() {
            self.model_program.clone()
        } else {
            model_dir.join(&self.model_program)
        }
    }

    /// Day-of-year tables with the configured leap list
    pub fn calendar(&self) -> DayOfYearCalculator {
        DayOfYearCalculator::new(self.leap_years.clone(), self.include_december)
    }

    /// Open both record files, cached or per call
    pub fn index_store(&self) -> ResolveResult<SpaceWeatherIndexStore> {
        Ok(SpaceWeatherIndexStore::new(
            open_records(&self.solar_flux_path, self.cache_records)?,
            open_records(&self.geomagnetic_path, self.cache_records)?,
        ))
    }

    /// Driver process with both paths made absolute
    pub fn model(&self) -> ResolveResult<Nrlmsise00Process> {
        let model_dir = self.absolute_model_dir()?;
        let program = self.program_in(&model_dir);
        Ok(Nrlmsise00Process::new(program, model_dir, self.timeout()))
    }

    /// Output normalizer with the configured sentinel and marker column
    pub fn normalizer(&self) -> DensityResultNormalizer {
        DensityResultNormalizer::new(self.sentinel_density, self.marker_column)
    }

    /// Assemble a resolver; record files are opened (and cached if enabled) here
    pub fn build(&self) -> ResolveResult<DragDensityResolver> {
        self.validate()?;
        let resolver =
            DragDensityResolver::new(self.calendar(), self.index_store()?, Box::new(self.model()?))
                .with_normalizer(self.normalizer());
        Ok(resolver)
    }
}
