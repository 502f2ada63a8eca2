//! Calendar date handling. Transactions carry a date with no time component, but the server may
//! hand them back as full timestamps. Everything is normalized to `NaiveDate` on the way in and
//! written as `YYYY-MM-DD` on the way out, which is also the format the form editor expects.

use crate::error::Res;
use anyhow::bail;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serializer};

/// The date format used on the wire and in the form editor.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a date given as `YYYY-MM-DD`, an RFC 3339 timestamp, or a naive `YYYY-MM-DDTHH:MM:SS`
/// timestamp, keeping only the calendar date.
pub fn parse_date(s: &str) -> Res<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        bail!("A date is required");
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Ok(date);
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(s) {
        return Ok(date_time.date_naive());
    }
    if let Ok(date_time) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(date_time.date());
    }
    bail!("'{s}' is not a valid date, expected YYYY-MM-DD")
}

/// Formats a date the way the form editor and the server expect it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// For use with `#[serde(with = "...")]` on `NaiveDate` fields.
pub(crate) mod wire {
    use super::*;

    pub(crate) fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_date(*date))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_date(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(parse_date("2024-01-01").unwrap(), ymd(2024, 1, 1));
    }

    #[test]
    fn test_parse_server_timestamp() {
        assert_eq!(
            parse_date("2024-03-09T00:00:00.000Z").unwrap(),
            ymd(2024, 3, 9)
        );
        assert_eq!(
            parse_date("2024-03-09T18:30:00+02:00").unwrap(),
            ymd(2024, 3, 9)
        );
        assert_eq!(parse_date("2024-03-09T10:11:12").unwrap(), ymd(2024, 3, 9));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_date("").is_err());
        assert!(parse_date("   ").is_err());
        assert!(parse_date("09/03/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(ymd(2024, 1, 5)), "2024-01-05");
    }
}
