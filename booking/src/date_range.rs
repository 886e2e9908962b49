//! Check-in/check-out pairs.

use crate::error::{BookingError, Result};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// Wire format of booking dates
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated stay: `check_out` is strictly after `check_in`
///
/// The range is half-open; the check-out day is not a night of the stay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct DateRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

#[derive(Deserialize)]
struct RawRange {
    check_in: NaiveDate,
    check_out: NaiveDate,
}

impl TryFrom<RawRange> for DateRange {
    type Error = BookingError;

    fn try_from(raw: RawRange) -> Result<Self> {
        Self::new(raw.check_in, raw.check_out)
    }
}

impl DateRange {
    /// Creates a range
    ///
    /// # Errors
    ///
    /// [`BookingError::InvalidRange`] if `check_out <= check_in`.
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self> {
        if check_out <= check_in {
            return Err(BookingError::InvalidRange {
                check_in: check_in.to_string(),
                check_out: check_out.to_string(),
                field: "check_out".to_string(),
                reason: "check-out must be after check-in".to_string(),
            });
        }
        Ok(Self { check_in, check_out })
    }

    /// Parses form or backend values
    ///
    /// Accepts `YYYY-MM-DD` and RFC 3339 timestamps (the date part is used).
    ///
    /// # Errors
    ///
    /// [`BookingError::InvalidRange`] if either value is not a calendar date
    /// or the range is empty.
    pub fn parse(check_in: &str, check_out: &str) -> Result<Self> {
        let invalid = |field: &str| BookingError::InvalidRange {
            check_in: check_in.to_string(),
            check_out: check_out.to_string(),
            field: field.to_string(),
            reason: format!("{field} is not a valid calendar date"),
        };
        let start = parse_date(check_in).ok_or_else(|| invalid("check_in"))?;
        let end = parse_date(check_out).ok_or_else(|| invalid("check_out"))?;
        Self::new(start, end)
    }

    /// First night
    #[must_use]
    pub const fn check_in(&self) -> NaiveDate {
        self.check_in
    }

    /// Departure day
    #[must_use]
    pub const fn check_out(&self) -> NaiveDate {
        self.check_out
    }

    /// Number of nights, never less than one
    #[must_use]
    pub fn nights(&self) -> u32 {
        let days = (self.check_out - self.check_in).num_days().max(1);
        u32::try_from(days).unwrap_or(u32::MAX)
    }

    /// Whether `date` is one of the nights of the stay
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.check_in <= date && date < self.check_out
    }

    /// Whether the two stays share at least one night
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|t| t.date_naive()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn two_nights_in_may() {
        let stay = DateRange::parse("2024-05-01", "2024-05-03").unwrap();
        assert_eq!(stay.nights(), 2);
        assert!(stay.contains(date("2024-05-02")));
        assert!(!stay.contains(date("2024-05-03")));
    }

    #[test]
    fn empty_and_reversed_ranges_are_rejected() {
        let same_day = DateRange::new(date("2024-05-01"), date("2024-05-01"));
        assert!(matches!(same_day, Err(BookingError::InvalidRange { .. })));

        let reversed = DateRange::parse("2024-05-03", "2024-05-01").unwrap_err();
        assert_eq!(reversed.field(), "check_out");
    }

    #[test]
    fn non_calendar_dates_are_rejected_with_the_field_named() {
        let error = DateRange::parse("2024-02-30", "2024-03-02").unwrap_err();
        let BookingError::InvalidRange { reason, check_in, .. } = error else {
            unreachable!("parse only fails with InvalidRange");
        };
        assert_eq!(check_in, "2024-02-30");
        assert_eq!(reason, "check_in is not a valid calendar date");

        assert!(DateRange::parse("2024-05-01", "tomorrow").is_err());
    }

    #[test]
    fn errors_point_at_the_side_that_failed() {
        assert_eq!(DateRange::parse("2024-13-01", "2024-05-03").unwrap_err().field(), "check_in");
        assert_eq!(DateRange::parse("2024-05-01", "2024-05-32").unwrap_err().field(), "check_out");
        assert_eq!(DateRange::parse("2024-05-03", "2024-05-03").unwrap_err().field(), "check_out");
    }

    #[test]
    fn backend_timestamps_use_their_date() {
        let stay = DateRange::parse("2024-05-01T00:00:00Z", "2024-05-04T00:00:00+00:00").unwrap();
        assert_eq!(stay.nights(), 3);
    }

    #[test]
    fn adjacent_stays_do_not_overlap() {
        let first = DateRange::parse("2024-05-01", "2024-05-03").unwrap();
        let second = DateRange::parse("2024-05-03", "2024-05-05").unwrap();
        let straddling = DateRange::parse("2024-05-02", "2024-05-04").unwrap();
        assert!(!first.overlaps(&second));
        assert!(first.overlaps(&straddling));
        assert!(second.overlaps(&straddling));
    }

    #[test]
    fn deserialization_enforces_the_invariant() {
        let ok: DateRange =
            serde_json::from_str(r#"{"check_in":"2024-05-01","check_out":"2024-05-02"}"#).unwrap();
        assert_eq!(ok.nights(), 1);
        let bad = serde_json::from_str::<DateRange>(r#"{"check_in":"2024-05-02","check_out":"2024-05-01"}"#);
        assert!(bad.is_err());
    }
}
