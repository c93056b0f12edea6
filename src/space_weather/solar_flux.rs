//! F10.7 / F10.7A lookup in the solar flux record file
//!
//! Records are keyed on `<year><pad><previous day>`, the day right-aligned to
//! three columns. A line matches when it contains the key anywhere; the last
//! match in file order wins.

use super::records::RecordSource;
use crate::errors::{DensityError, ResolveResult};

/// Solar flux values for one day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarFlux {
    pub f107: f64,
    pub f107a: f64,
}

/// Search key for a flux record
pub fn flux_key(f107_year: i32, previous_day_of_year: u32) -> String {
    let day = previous_day_of_year.to_string();
    let separator = match day.len() {
        3 => " ",
        2 => "  ",
        _ => "   ",
    };
    format!("{f107_year}{separator}{day}")
}

/// Find F10.7 and F10.7A for the day before the epoch
pub fn lookup_solar_flux(
    source: &dyn RecordSource,
    f107_year: i32,
    previous_day_of_year: u32,
) -> ResolveResult<SolarFlux> {
    let key = flux_key(f107_year, previous_day_of_year);

    let mut matched: Option<String> = None;
    source.scan(&mut |line| {
        if line.contains(&key) {
            matched = Some(line.to_string());
        }
    })?;

    let line = matched.ok_or_else(|| DensityError::index_not_found("F10.7", key.as_str()))?;
    log::debug!("F10.7 record for '{}': {}", key, line.trim());
    parse_flux_line(&line)
}

/// Fields 4 and 5 of a matched record
fn parse_flux_line(line: &str) -> ResolveResult<SolarFlux> {
    let fields: Vec<&str> = line.split_whitespace().take(5).collect();
    if fields.len() < 5 {
        return Err(DensityError::parsing_error(format!(
            "flux record has {} fields, expected 5: '{}'",
            fields.len(),
            line.trim()
        )));
    }

    let f107 = parse_flux_field("F10.7", fields[3])?;
    let f107a = parse_flux_field("F10.7A", fields[4])?;
    Ok(SolarFlux { f107, f107a })
}

fn parse_flux_field(name: &str, value: &str) -> ResolveResult<f64> {
    let parsed: f64 = value
        .parse()
        .map_err(|_| DensityError::parsing_error(format!("invalid {name}: '{value}'")))?;
    if !parsed.is_finite() {
        return Err(DensityError::parsing_error(format!(
            "non-finite {name}: '{value}'"
        )));
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space_weather::records::RecordCache;

    const SOLFSMY: &str = "\
# SOLFSMY.TXT
# YYYY DDD   JulianDay  F10   F81c  S10   S81c
2019 365 2458849.0   71.8  70.9  65.2  66.1
2020   1 2458850.0   72.0  71.0  65.4  66.2
2020  74 2458923.0   70.1  71.4  63.0  64.8
2020 100 2458949.0   69.8  70.2  62.1  63.0
";

    fn source() -> RecordCache {
        RecordCache::from_text("SOLFSMY.TXT", SOLFSMY)
    }

    #[test]
    fn test_key_padding() {
        assert_eq!(flux_key(2020, 100), "2020 100");
        assert_eq!(flux_key(2020, 74), "2020  74");
        assert_eq!(flux_key(2020, 1), "2020   1");
    }

    #[test]
    fn test_lookup_by_width() {
        let source = source();

        let flux = lookup_solar_flux(&source, 2020, 74).unwrap();
        assert_eq!(flux.f107, 70.1);
        assert_eq!(flux.f107a, 71.4);

        let flux = lookup_solar_flux(&source, 2020, 100).unwrap();
        assert_eq!(flux.f107, 69.8);

        let flux = lookup_solar_flux(&source, 2020, 1).unwrap();
        assert_eq!(flux.f107, 72.0);

        let flux = lookup_solar_flux(&source, 2019, 365).unwrap();
        assert_eq!(flux.f107a, 70.9);
    }

    #[test]
    fn test_last_match_wins() {
        let text = "\
2020  74 2458923.0   70.1  71.4
2020  74 2458923.0   88.8  77.7
2020  75 2458924.0   70.0  71.0
";
        let source = RecordCache::from_text("dup", text);
        let flux = lookup_solar_flux(&source, 2020, 74).unwrap();
        assert_eq!(flux.f107, 88.8);
        assert_eq!(flux.f107a, 77.7);
    }

    #[test]
    fn test_no_match() {
        let result = lookup_solar_flux(&source(), 2021, 74);
        assert!(matches!(
            result,
            Err(DensityError::IndexNotFound { index: "F10.7", .. })
        ));
    }

    #[test]
    fn test_short_matched_line() {
        let source = RecordCache::from_text("short", "2020  74 2458923.0 70.1\n");
        let result = lookup_solar_flux(&source, 2020, 74);
        assert!(matches!(result, Err(DensityError::Parse { .. })));
    }

    #[test]
    fn test_non_numeric_field() {
        let source = RecordCache::from_text("bad", "2020  74 2458923.0 n/a 71.4\n");
        let result = lookup_solar_flux(&source, 2020, 74);
        assert!(matches!(result, Err(DensityError::Parse { .. })));
    }
}
