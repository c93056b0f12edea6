//! Space weather inputs for the density model
//!
//! Two independent record files feed one resolution:
//!
//! - **Solar flux** (SOLFSMY-style): F10.7 and its 81-day mean, keyed by
//!   year and day-of-year of the *previous* day
//! - **Geomagnetic** (apindex-style): eight three-hourly Ap values, keyed by `yymmdd`

mod geomagnetic;
mod records;
mod solar_flux;

pub use geomagnetic::{ap_key, daily_ap, lookup_ap_fields};
pub use records::{open_records, RecordCache, RecordFile, RecordSource};
pub use solar_flux::{flux_key, lookup_solar_flux, SolarFlux};

use crate::epoch::{DayOfYearInfo, Epoch};
use crate::errors::ResolveResult;
use serde::Serialize;

/// Index values passed to the density model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpaceWeatherIndices {
    pub f107: f64,
    pub f107a: f64,
    /// Rounded daily mean of the eight three-hourly values
    pub ap: i32,
}

pub struct SpaceWeatherIndexStore {
    solar_flux: Box<dyn RecordSource>,
    geomagnetic: Box<dyn RecordSource>,
}

impl SpaceWeatherIndexStore {
    /// Store over a flux source and an Ap source
    pub fn new(solar_flux: Box<dyn RecordSource>, geomagnetic: Box<dyn RecordSource>) -> Self {
        Self {
            solar_flux,
            geomagnetic,
        }
    }

    /// F10.7 and F10.7A keyed by year and previous day-of-year
    pub fn solar_flux(&self, f107_year: i32, previous_day_of_year: u32) -> ResolveResult<SolarFlux> {
        lookup_solar_flux(self.solar_flux.as_ref(), f107_year, previous_day_of_year)
    }

    /// Rounded daily mean Ap for a calendar date
    pub fn daily_ap(&self, year: i32, month: u32, day: u32) -> ResolveResult<i32> {
        let fields = lookup_ap_fields(self.geomagnetic.as_ref(), year, month, day)?;
        daily_ap(&fields)
    }

    /// All three indices for an epoch
    pub fn indices(&self, epoch: &Epoch, day: &DayOfYearInfo) -> ResolveResult<SpaceWeatherIndices> {
        let flux = self.solar_flux(day.f107_lookup_year, day.previous_day_of_year)?;
        let ap = self.daily_ap(epoch.year, epoch.month, epoch.day)?;

        log::debug!(
            "Space weather for {}: F10.7={} F10.7A={} Ap={} (flux from {}, Ap from {})",
            epoch,
            flux.f107,
            flux.f107a,
            ap,
            self.solar_flux.describe(),
            self.geomagnetic.describe()
        );

        Ok(SpaceWeatherIndices {
            f107: flux.f107,
            f107a: flux.f107a,
            ap,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epoch::DayOfYearCalculator;
    use crate::errors::DensityError;

    const SOLFSMY: &str = "\
2020 365 2459214.0   71.8  70.9
2020  74 2458923.0   70.1  71.4
";

    fn apindex() -> String {
        [
            format!("210101{}  4  4  3  3  2  2  3  4", " ".repeat(25)),
            format!("200315{}  5 10 15 20 25 30 35 40", " ".repeat(25)),
        ]
        .join("\n")
    }

    fn store() -> SpaceWeatherIndexStore {
        SpaceWeatherIndexStore::new(
            Box::new(RecordCache::from_text("SOLFSMY.TXT", SOLFSMY)),
            Box::new(RecordCache::from_text("apindex", &apindex())),
        )
    }

    #[test]
    fn test_indices_for_epoch() {
        let epoch = Epoch::parse("15/03/2020 12:30:45.000000 Z").unwrap();
        let day = DayOfYearCalculator::default().for_epoch(&epoch).unwrap();

        let indices = store().indices(&epoch, &day).unwrap();
        assert_eq!(indices.f107, 70.1);
        assert_eq!(indices.f107a, 71.4);
        assert_eq!(indices.ap, 23);
    }

    #[test]
    fn test_new_year_uses_previous_year_flux() {
        let epoch = Epoch::parse("1/1/2021 00:00:00.000000 UTC").unwrap();
        let day = DayOfYearCalculator::default().for_epoch(&epoch).unwrap();
        assert_eq!(day.f107_lookup_year, 2020);

        let indices = store().indices(&epoch, &day).unwrap();
        assert_eq!(indices.f107, 71.8);
        assert_eq!(indices.ap, 3);
    }

    #[test]
    fn test_missing_ap_is_typed() {
        let epoch = Epoch::parse("16/03/2020 00:00:00.000000 UTC").unwrap();
        let day = DayOfYearCalculator::default().for_epoch(&epoch).unwrap();
        // Flux for day 75 is absent too; flux is looked up first
        let result = store().indices(&epoch, &day);
        assert!(matches!(
            result,
            Err(DensityError::IndexNotFound { index: "F10.7", .. })
        ));

        let result = store().daily_ap(2020, 3, 16);
        assert!(matches!(
            result,
            Err(DensityError::IndexNotFound { index: "Ap", .. })
        ));
    }
}
