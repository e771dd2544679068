//! Datapoint timestamp codec.
//!
//! Upstream stamps every datapoint with a compact 14-digit code,
//! `YYYYMMDDHHMMSS`, in the camera's local convention. Everything here is a
//! pure function of that code: field extraction by fixed offsets, bucket
//! derivation, and conversion to an instant used only for relative ordering.

use chrono::NaiveDate;
use std::fmt;

pub const CODE_LEN: usize = 14;

/// A timestamp code that does not satisfy the 14-digit contract, or whose
/// fields are not a real calendar time. Never silently coerced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedTimestamp {
    pub code: String,
}

impl fmt::Display for MalformedTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed timestamp code: {:?}", self.code)
    }
}

impl std::error::Error for MalformedTimestamp {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

fn reject(code: &str) -> MalformedTimestamp {
    MalformedTimestamp { code: code.to_string() }
}

fn digits(code: &str, range: std::ops::Range<usize>) -> u32 {
    // Caller has already verified the code is 14 ASCII digits.
    code[range].parse().unwrap_or(0)
}

fn check_shape(code: &str) -> Result<(), MalformedTimestamp> {
    if code.len() != CODE_LEN || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(reject(code));
    }
    Ok(())
}

pub fn parse_fields(code: &str) -> Result<TimeFields, MalformedTimestamp> {
    check_shape(code)?;
    Ok(TimeFields {
        year: digits(code, 0..4) as i32,
        month: digits(code, 4..6),
        day: digits(code, 6..8),
        hour: digits(code, 8..10),
        minute: digits(code, 10..12),
        second: digits(code, 12..14),
    })
}

/// Milliseconds since epoch for ordering purposes. The fields are taken as a
/// naive timestamp in the code's own convention; the absolute offset cancels
/// out under comparison, which is the only use.
pub fn to_instant(code: &str) -> Result<i64, MalformedTimestamp> {
    let f = parse_fields(code)?;
    let date = NaiveDate::from_ymd_opt(f.year, f.month, f.day).ok_or_else(|| reject(code))?;
    let dt = date
        .and_hms_opt(f.hour, f.minute, f.second)
        .ok_or_else(|| reject(code))?;
    Ok(dt.and_utc().timestamp_millis())
}

/// Quarter-hour bin of the minute field: 0, 15, 30, 45.
pub fn quarter_bin(code: &str) -> Result<usize, MalformedTimestamp> {
    check_shape(code)?;
    Ok(digits(code, 10..12) as usize / 15)
}

/// Hour-of-day, 24-hour zero-based, verbatim from the HH field.
pub fn hour_of_day(code: &str) -> Result<usize, MalformedTimestamp> {
    check_shape(code)?;
    let hour = digits(code, 8..10) as usize;
    if hour > 23 {
        return Err(reject(code));
    }
    Ok(hour)
}

/// Calendar-day key, the leading `YYYYMMDD` of the code.
pub fn date_key(code: &str) -> Result<&str, MalformedTimestamp> {
    check_shape(code)?;
    Ok(&code[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields_fixed_offsets() {
        let f = parse_fields("20240305143059").unwrap();
        assert_eq!(f.year, 2024);
        assert_eq!(f.month, 3);
        assert_eq!(f.day, 5);
        assert_eq!(f.hour, 14);
        assert_eq!(f.minute, 30);
        assert_eq!(f.second, 59);
    }

    #[test]
    fn test_malformed_codes_rejected() {
        for bad in ["", "2024", "20240305143059x", "2024030514305", "2024030514305a"] {
            assert!(parse_fields(bad).is_err(), "accepted {:?}", bad);
        }
        // 14 digits but not a calendar time
        assert!(to_instant("20241305143000").is_err());
        assert!(to_instant("20240305253000").is_err());
    }

    #[test]
    fn test_quarter_bin_boundaries() {
        assert_eq!(quarter_bin("20240101120000").unwrap(), 0);
        assert_eq!(quarter_bin("20240101121500").unwrap(), 1);
        assert_eq!(quarter_bin("20240101124400").unwrap(), 2);
        assert_eq!(quarter_bin("20240101125900").unwrap(), 3);
    }

    #[test]
    fn test_hour_and_date_key() {
        assert_eq!(hour_of_day("20240305143000").unwrap(), 14);
        assert_eq!(date_key("20240305143000").unwrap(), "20240305");
    }

    #[test]
    fn test_instant_orders_chronologically() {
        let early = to_instant("20240101120500").unwrap();
        let late = to_instant("20240101121100").unwrap();
        let next_day = to_instant("20240102000000").unwrap();
        assert!(early < late);
        assert!(late < next_day);
    }
}
