//! Mission epoch decomposition
//!
//! The propagator hands over its UTC datestamp as text. Two layouts occur:
//!
//! - 3 tokens: `D/M/YYYY HH:MM:SS.ffffff <zone>` (day and month-year joined by `/`)
//! - 4 tokens: `D/ M/YYYY, HH:MM:SS.ffffff <zone>` (day padded into its own token)
//!
//! The day token may keep its trailing `/` and the month-year token may keep
//! trailing punctuation. The `second_of_day` field is seconds since midnight,
//! not seconds of the minute.

mod day_of_year;

pub use day_of_year::{DayOfYearCalculator, DayOfYearInfo, DEFAULT_LEAP_YEARS};

use crate::errors::{DensityError, ResolveResult};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

/// Calendar fields extracted from a mission epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Epoch {
    pub year: i32,
    /// 1-12
    pub month: u32,
    /// 1-31
    pub day: u32,
    /// hour * 3600 + minute * 60 + second, 0-86399
    pub second_of_day: u32,
}

impl Epoch {
    /// Decompose a textual datestamp into calendar fields
    pub fn parse(text: &str) -> ResolveResult<Self> {
        let tokens: Vec<&str> = text.split_whitespace().collect();

        let (day_token, month_year_token, time_token) = match tokens.as_slice() {
            [date, time, _zone] => {
                let (day, month_year) = date
                    .split_once('/')
                    .ok_or_else(|| DensityError::epoch_format(text, "date token has no '/'"))?;
                (day, month_year, *time)
            }
            [day, month_year, time, _zone] => (*day, *month_year, *time),
            _ => {
                return Err(DensityError::epoch_format(
                    text,
                    format!("expected 3 or 4 tokens, found {}", tokens.len()),
                ))
            }
        };

        let day = parse_day(text, day_token)?;
        let (month, year) = parse_month_year(text, month_year_token)?;
        let second_of_day = parse_second_of_day(text, time_token)?;

        if NaiveDate::from_ymd_opt(year, month, day).is_none() {
            return Err(DensityError::epoch_format(
                text,
                format!("{year:04}-{month:02}-{day:02} is not a calendar date"),
            ));
        }

        Ok(Self {
            year,
            month,
            day,
            second_of_day,
        })
    }

    /// Build from a chrono datetime, discarding sub-second precision
    pub fn from_datetime(datetime: &NaiveDateTime) -> Self {
        Self {
            year: datetime.year(),
            month: datetime.month(),
            day: datetime.day(),
            second_of_day: datetime.num_seconds_from_midnight(),
        }
    }

    pub fn hour(&self) -> u32 {
        self.second_of_day / 3600
    }

    pub fn minute(&self) -> u32 {
        (self.second_of_day % 3600) / 60
    }

    pub fn second(&self) -> u32 {
        self.second_of_day % 60
    }

    /// Render in the 3-token layout accepted by [`Epoch::parse`]
    pub fn datestamp(&self) -> String {
        format!(
            "{:02}/{:02}/{:04} {:02}:{:02}:{:02}.000000 UTC",
            self.day,
            self.month,
            self.year,
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

impl std::str::FromStr for Epoch {
    type Err = DensityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl std::fmt::Display for Epoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.datestamp())
    }
}

fn parse_day(text: &str, token: &str) -> ResolveResult<u32> {
    // "5/" and "15/" come from the padded layout, "5" and "15" from the joined one
    let digits = token.strip_suffix('/').unwrap_or(token);
    if digits.is_empty() || digits.len() > 2 {
        return Err(DensityError::epoch_format(
            text,
            format!("day token '{token}' is not 1 or 2 digits"),
        ));
    }

    let day = parse_number(text, "day", digits)?;
    if !(1..=31).contains(&day) {
        return Err(DensityError::epoch_format(text, format!("day {day} out of range")));
    }
    Ok(day)
}

fn parse_month_year(text: &str, token: &str) -> ResolveResult<(u32, i32)> {
    let stripped = token.trim_end_matches(|c: char| !c.is_ascii_digit());
    if stripped.len() < 5 || !stripped.is_char_boundary(stripped.len() - 4) {
        return Err(DensityError::epoch_format(
            text,
            format!("month-year token '{token}' is too short"),
        ));
    }

    // Year is always the trailing 4 digits; "M/YYYY" and "MYYYY" carry a one-digit month
    let (month_part, year_part) = stripped.split_at(stripped.len() - 4);
    let month_field = month_part.strip_suffix('/').unwrap_or(month_part);
    if month_field.is_empty() || month_field.len() > 2 {
        return Err(DensityError::epoch_format(
            text,
            format!("month-year token '{token}' has an unexpected month field"),
        ));
    }

    let month = parse_number(text, "month", month_field)?;
    if !(1..=12).contains(&month) {
        return Err(DensityError::epoch_format(
            text,
            format!("month {month} out of range"),
        ));
    }

    let year = parse_number(text, "year", year_part)? as i32;
    Ok((month, year))
}

fn parse_second_of_day(text: &str, token: &str) -> ResolveResult<u32> {
    let (first, last) = match (token.find(':'), token.rfind(':')) {
        (Some(first), Some(last)) if first < last => (first, last),
        _ => {
            return Err(DensityError::epoch_format(
                text,
                format!("time token '{token}' is not HH:MM:SS"),
            ))
        }
    };

    let hour = parse_number(text, "hour", &token[..first])?;
    let minute = parse_number(text, "minute", &token[first + 1..last])?;

    let seconds_field = &token[last + 1..];
    let whole = seconds_field.split('.').next().unwrap_or(seconds_field);
    let second = parse_number(text, "second", whole)?;

    if hour > 23 || minute > 59 || second > 59 {
        return Err(DensityError::epoch_format(
            text,
            format!("time {hour}:{minute}:{second} out of range"),
        ));
    }

    Ok(second + minute * 60 + hour * 3600)
}

fn parse_number(text: &str, field: &str, value: &str) -> ResolveResult<u32> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DensityError::epoch_format(
            text,
            format!("{field} field '{value}' is not a number"),
        ));
    }
    value
        .parse::<u32>()
        .map_err(|e| DensityError::epoch_format(text, format!("{field} field '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_token_layout() {
        let epoch = Epoch::parse("15/03/2020 12:30:45.000000 Z").unwrap();
        assert_eq!(epoch.year, 2020);
        assert_eq!(epoch.month, 3);
        assert_eq!(epoch.day, 15);
        assert_eq!(epoch.second_of_day, 12 * 3600 + 30 * 60 + 45);
    }

    #[test]
    fn test_four_token_layout_single_digits() {
        let epoch = Epoch::parse("5/ 3/2020, 01:02:03.500000 UTC").unwrap();
        assert_eq!((epoch.year, epoch.month, epoch.day), (2020, 3, 5));
        assert_eq!(epoch.second_of_day, 3723);
    }

    #[test]
    fn test_four_token_layout_two_digit_day() {
        let epoch = Epoch::parse("21/ 7/2016, 23:59:59.999999 UTC").unwrap();
        assert_eq!((epoch.year, epoch.month, epoch.day), (2016, 7, 21));
        assert_eq!(epoch.second_of_day, 86_399);
    }

    #[test]
    fn test_three_token_two_digit_day_and_month() {
        let epoch = Epoch::parse("15/10/2020, 00:00:00.000000 UTC").unwrap();
        assert_eq!((epoch.year, epoch.month, epoch.day), (2020, 10, 15));
        assert_eq!(epoch.second_of_day, 0);
    }

    #[test]
    fn test_compact_month_year_token() {
        let epoch = Epoch::parse("09 112019 06:00:00.000000 UTC").unwrap();
        assert_eq!((epoch.year, epoch.month, epoch.day), (2019, 11, 9));
    }

    #[test]
    fn test_fraction_is_discarded() {
        let epoch = Epoch::parse("1/1/2018 00:00:07.999999 UTC").unwrap();
        assert_eq!(epoch.second_of_day, 7);
    }

    #[test]
    fn test_wrong_token_count() {
        let result = Epoch::parse("15/03/2020 12:30:45.000000");
        assert!(matches!(result, Err(DensityError::EpochFormat { .. })));

        let result = Epoch::parse("15 03 2020 12:30:45 UTC");
        assert!(matches!(result, Err(DensityError::EpochFormat { .. })));
    }

    #[test]
    fn test_bad_fields() {
        for text in [
            "15-03-2020 12:30:45.0 Z",
            "15/13/2020 12:30:45.0 Z",
            "31/04/2020 12:30:45.0 Z",
            "15/03/2020 12-30-45.0 Z",
            "15/03/2020 24:00:00.0 Z",
            "1x/03/2020 12:30:45.0 Z",
            "15/03/20 12:30:45.0 Z",
        ] {
            assert!(
                matches!(Epoch::parse(text), Err(DensityError::EpochFormat { .. })),
                "expected failure for {text}"
            );
        }
    }

    #[test]
    fn test_datestamp_round_trip() {
        for text in [
            "15/03/2020 12:30:45.000000 Z",
            "5/ 3/2020, 01:02:03.000000 UTC",
            "29/02/2016 23:59:59.000000 UTC",
            "1/1/1999 00:00:00.000000 UTC",
        ] {
            let epoch = Epoch::parse(text).unwrap();
            let again = Epoch::parse(&epoch.datestamp()).unwrap();
            assert_eq!(epoch, again, "round trip of {text}");
        }
    }

    #[test]
    fn test_from_datetime() {
        let datetime = NaiveDate::from_ymd_opt(2012, 6, 30)
            .unwrap()
            .and_hms_milli_opt(18, 15, 30, 750)
            .unwrap();
        let epoch = Epoch::from_datetime(&datetime);
        assert_eq!((epoch.year, epoch.month, epoch.day), (2012, 6, 30));
        assert_eq!(epoch.second_of_day, 18 * 3600 + 15 * 60 + 30);
        assert_eq!(epoch.to_string(), "30/06/2012 18:15:30.000000 UTC");
    }
}
