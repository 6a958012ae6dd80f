use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};

/// Get the Monday that starts the week containing the given date.
pub fn week_start(d: NaiveDate) -> NaiveDate {
    d - Duration::days(d.weekday().num_days_from_monday() as i64)
}

/// Parse an ISO `YYYY-MM-DD` date string from caller-supplied filter input.
/// A malformed explicit date is a caller bug and surfaces as an error.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| Error::DateParse(s.to_string()))
}

/// Elapsed time between two instants, in fractional days.
pub fn fractional_days(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    (to - from).num_seconds() as f64 / 86_400.0
}

/// Round to one decimal place, the precision every reported rate and
/// duration uses.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_week_start() {
        // 2026-08-05 is a Wednesday
        let wed = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        let ws = week_start(wed);
        assert_eq!(ws, NaiveDate::from_ymd_opt(2026, 8, 3).unwrap());
        assert_eq!(ws.weekday(), Weekday::Mon);

        // Monday is its own week start
        assert_eq!(week_start(ws), ws);

        // Sunday belongs to the preceding Monday
        let sun = NaiveDate::from_ymd_opt(2026, 8, 9).unwrap();
        assert_eq!(week_start(sun), ws);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2026-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
        );
        assert_eq!(
            parse_date(" 2026-01-15 ").unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
        );
        assert!(parse_date("2026-13-01").is_err());
        assert!(parse_date("01/15/2026").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_fractional_days() {
        let a = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let b = NaiveDate::from_ymd_opt(2026, 1, 2)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert!((fractional_days(a, b) - 1.5).abs() < 1e-9);
        assert!((fractional_days(a, a) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(66.666), 66.7);
        assert_eq!(round1(0.0), 0.0);
        assert_eq!(round1(2.05), 2.1);
    }
}
