//! Day-of-year arithmetic against the model's cumulative-day tables
//!
//! Leap years come from an explicit list, not the Gregorian divisibility rule.
//! Both tables stop at November unless December support is switched on.

use super::Epoch;
use crate::errors::{DensityError, ResolveResult};
use serde::Serialize;
use std::collections::BTreeMap;

/// Leap years known to the density model's data files
///
/// 2996 is carried over verbatim from the model set-up; 1996 is absent.
pub const DEFAULT_LEAP_YEARS: &[i32] = &[1992, 2996, 2000, 2004, 2008, 2012, 2016, 2020];

const CAL_DAYS: [(u32, u32); 11] = [
    (1, 0),
    (2, 31),
    (3, 59),
    (4, 90),
    (5, 120),
    (6, 151),
    (7, 181),
    (8, 212),
    (9, 243),
    (10, 273),
    (11, 304),
];

const LEAP_DAYS: [(u32, u32); 11] = [
    (1, 0),
    (2, 31),
    (3, 60),
    (4, 91),
    (5, 121),
    (6, 152),
    (7, 182),
    (8, 213),
    (9, 244),
    (10, 274),
    (11, 305),
];

/// Day-of-year plus the key used for the F10.7 lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayOfYearInfo {
    pub day_of_year: u32,
    pub previous_day_of_year: u32,
    /// Year of the previous day (rolls back on 1 January)
    pub f107_lookup_year: i32,
}

#[derive(Debug, Clone)]
pub struct DayOfYearCalculator {
    cal_days: BTreeMap<u32, u32>,
    leap_days: BTreeMap<u32, u32>,
    leap_years: Vec<i32>,
}

impl Default for DayOfYearCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_LEAP_YEARS.to_vec(), false)
    }
}

impl DayOfYearCalculator {
    /// Build the tables
    ///
    /// With `include_december` false, month 12 is a [`DensityError::LookupTable`].
    pub fn new(leap_years: Vec<i32>, include_december: bool) -> Self {
        let mut cal_days: BTreeMap<u32, u32> = CAL_DAYS.into_iter().collect();
        let mut leap_days: BTreeMap<u32, u32> = LEAP_DAYS.into_iter().collect();

        if include_december {
            cal_days.insert(12, 334);
            leap_days.insert(12, 335);
        }

        Self {
            cal_days,
            leap_days,
            leap_years,
        }
    }

    /// Membership in the configured leap list, not the Gregorian rule
    pub fn is_leap_year(&self, year: i32) -> bool {
        self.leap_years.contains(&year)
    }

    /// Configured leap list
    pub fn leap_years(&self) -> &[i32] {
        &self.leap_years
    }

    /// Fails with `LookupTable` for a month missing from the table in use
    pub fn day_of_year(&self, year: i32, month: u32, day: u32) -> ResolveResult<DayOfYearInfo> {
        let leap = self.is_leap_year(year);
        let (table, table_name, year_length) = if leap {
            (&self.leap_days, "leap_days", 366)
        } else {
            (&self.cal_days, "cal_days", 365)
        };

        let cumulative = table.get(&month).copied().ok_or(DensityError::LookupTable {
            month,
            table: table_name,
        })?;

        let day_of_year = cumulative + day;
        let info = if day_of_year > 1 {
            DayOfYearInfo {
                day_of_year,
                previous_day_of_year: day_of_year - 1,
                f107_lookup_year: year,
            }
        } else {
            DayOfYearInfo {
                day_of_year,
                previous_day_of_year: year_length,
                f107_lookup_year: year - 1,
            }
        };

        Ok(info)
    }

    /// [`Self::day_of_year`] for a decomposed epoch
    pub fn for_epoch(&self, epoch: &Epoch) -> ResolveResult<DayOfYearInfo> {
        self.day_of_year(epoch.year, epoch.month, epoch.day)
    }
}
