//! Ap geomagnetic index lookup and daily averaging
//!
//! The Ap record file is fixed-column: columns 0-5 hold `yymmdd`, columns
//! 31-54 hold eight 3-character three-hourly Ap values.

use super::records::RecordSource;
use crate::errors::{DensityError, ResolveResult};

const AP_FIELDS_START: usize = 31;
const AP_FIELD_WIDTH: usize = 3;
const AP_FIELD_COUNT: usize = 8;
const AP_FIELDS_END: usize = AP_FIELDS_START + AP_FIELD_WIDTH * AP_FIELD_COUNT;

/// `yymmdd` key of an Ap record
pub fn ap_key(year: i32, month: u32, day: u32) -> String {
    format!("{:02}{:02}{:02}", year.rem_euclid(100), month, day)
}

/// Find the eight three-hourly Ap values for a date, as raw 24-character text
pub fn lookup_ap_fields(
    source: &dyn RecordSource,
    year: i32,
    month: u32,
    day: u32,
) -> ResolveResult<String> {
    let key = ap_key(year, month, day);

    let mut matched: Option<String> = None;
    source.scan(&mut |line| {
        if line.get(..6) == Some(key.as_str()) {
            matched = Some(line.to_string());
        }
    })?;

    let line = matched.ok_or_else(|| DensityError::index_not_found("Ap", key.as_str()))?;
    let fields = line.get(AP_FIELDS_START..AP_FIELDS_END).ok_or_else(|| {
        DensityError::parsing_error(format!(
            "Ap record for {key} is {} characters, expected at least {AP_FIELDS_END}",
            line.len()
        ))
    })?;

    log::debug!("Ap record for {}: '{}'", key, fields);
    Ok(fields.to_string())
}

/// Daily Ap: mean of the eight sub-values, rounded half away from zero
pub fn daily_ap(fields: &str) -> ResolveResult<i32> {
    if fields.len() != AP_FIELDS_END - AP_FIELDS_START {
        return Err(DensityError::parsing_error(format!(
            "Ap field block '{fields}' is not {} characters",
            AP_FIELD_WIDTH * AP_FIELD_COUNT
        )));
    }

    let mut sum = 0i32;
    for index in 0..AP_FIELD_COUNT {
        let start = index * AP_FIELD_WIDTH;
        let field = fields.get(start..start + AP_FIELD_WIDTH).ok_or_else(|| {
            DensityError::parsing_error(format!("Ap field block '{fields}' is not ASCII"))
        })?;
        let value: i32 = field.trim().parse().map_err(|_| {
            DensityError::parsing_error(format!("Ap sub-field {} is '{}'", index + 1, field))
        })?;
        sum += value;
    }

    Ok((f64::from(sum) / AP_FIELD_COUNT as f64).round() as i32)
}
