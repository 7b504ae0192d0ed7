//! Tests for date ranges and month keys

use chrono::{Days, NaiveDate};
use core_kernel::{month_key, DateRange, TemporalError};
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod date_range {
    use super::*;

    #[test]
    fn test_new_accepts_ordered_bounds() {
        let range = DateRange::new(date(2024, 10, 1), date(2024, 11, 1)).unwrap();

        assert_eq!(range.start(), date(2024, 10, 1));
        assert_eq!(range.end(), date(2024, 11, 1));
    }

    #[test]
    fn test_new_reports_both_bounds_on_error() {
        let result = DateRange::new(date(2024, 12, 1), date(2024, 1, 1));

        assert_eq!(
            result,
            Err(TemporalError::InvalidRange {
                start: date(2024, 12, 1),
                end: date(2024, 1, 1),
            })
        );
    }

    #[test]
    fn test_error_message_names_bounds() {
        let err = DateRange::new(date(2024, 11, 1), date(2024, 10, 1)).unwrap_err();
        let message = err.to_string();

        assert!(message.contains("2024-11-01"));
        assert!(message.contains("2024-10-01"));
    }

    #[test]
    fn test_calendar_year_out_of_range() {
        assert_eq!(
            DateRange::calendar_year(i32::MAX),
            Err(TemporalError::InvalidYear(i32::MAX))
        );
    }

    #[test]
    fn test_calendar_year_non_leap() {
        let range = DateRange::calendar_year(2023).unwrap();
        assert_eq!(range.num_days(), 365);
        assert!(range.contains(date(2023, 12, 31)));
        assert!(!range.contains(date(2024, 1, 1)));
    }

    #[test]
    fn test_display() {
        let range = DateRange::new(date(2024, 10, 1), date(2024, 11, 1)).unwrap();
        assert_eq!(range.to_string(), "2024-10-01 to 2024-11-01");
    }

    #[test]
    fn test_serde_uses_named_bounds() {
        let range = DateRange::new(date(2024, 10, 1), date(2024, 11, 1)).unwrap();
        let json = serde_json::to_value(range).unwrap();

        assert_eq!(json["start"], "2024-10-01");
        assert_eq!(json["end"], "2024-11-01");
    }
}

mod month_keys {
    use super::*;

    #[test]
    fn test_first_and_last_day_share_key() {
        assert_eq!(month_key(date(2024, 2, 1)), month_key(date(2024, 2, 29)));
    }

    #[test]
    fn test_december() {
        assert_eq!(month_key(date(2023, 12, 31)), "2023-12");
    }
}

proptest! {
    #[test]
    fn range_contains_start_but_not_end(offset in 0u64..10_000, len in 1u64..400) {
        let start = date(2000, 1, 1) + Days::new(offset);
        let end = start + Days::new(len);
        let range = DateRange::new(start, end).unwrap();

        prop_assert!(range.contains(start));
        prop_assert!(!range.contains(end));
        prop_assert_eq!(range.num_days(), len as i64);
    }

    #[test]
    fn inverted_ranges_always_rejected(offset in 0u64..10_000, len in 0u64..400) {
        let end = date(2000, 1, 1) + Days::new(offset);
        let start = end + Days::new(len);
        prop_assert!(DateRange::new(start, end).is_err());
    }
}
