use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;

/// All dates of a calendar month, in order.
pub fn days_in_month(year: i32, month: u32) -> Vec<NaiveDate> {
    (1..=31)
        .filter_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .collect()
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn is_weekend_or_holiday(date: NaiveDate, holidays: &BTreeSet<NaiveDate>) -> bool {
    is_weekend(date) || holidays.contains(&date)
}

/// ISO (year, week) bucket key. Weeks straddling a month boundary are real;
/// callers partition only the in-month days into these buckets.
pub fn week_key(date: NaiveDate) -> (i32, u32) {
    let iso = date.iso_week();
    (iso.year(), iso.week())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_enumeration_covers_whole_month() {
        assert_eq!(days_in_month(2025, 10).len(), 31);
        assert_eq!(days_in_month(2025, 11).len(), 30);
        assert_eq!(days_in_month(2025, 2).len(), 28);
        assert_eq!(days_in_month(2024, 2).len(), 29);

        let days = days_in_month(2025, 10);
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
        assert_eq!(days[30], NaiveDate::from_ymd_opt(2025, 10, 31).unwrap());
    }

    #[test]
    fn weekend_detection() {
        // 2025-10-04 is a Saturday, 2025-10-05 a Sunday
        assert!(is_weekend(NaiveDate::from_ymd_opt(2025, 10, 4).unwrap()));
        assert!(is_weekend(NaiveDate::from_ymd_opt(2025, 10, 5).unwrap()));
        assert!(!is_weekend(NaiveDate::from_ymd_opt(2025, 10, 6).unwrap()));
    }

    #[test]
    fn holiday_extends_weekend_classification() {
        let monday = NaiveDate::from_ymd_opt(2025, 10, 13).unwrap();
        let holidays: BTreeSet<NaiveDate> = [monday].into_iter().collect();
        assert!(is_weekend_or_holiday(monday, &holidays));
        assert!(!is_weekend_or_holiday(
            NaiveDate::from_ymd_opt(2025, 10, 14).unwrap(),
            &holidays
        ));
    }

    #[test]
    fn week_key_straddles_month_boundary() {
        // 2025-09-29 (Mon) and 2025-10-01 (Wed) share ISO week 40
        let sep = NaiveDate::from_ymd_opt(2025, 9, 29).unwrap();
        let oct = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        assert_eq!(week_key(sep), week_key(oct));

        // The ISO year of early January can differ from the calendar year
        let jan = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
        assert_eq!(week_key(jan), (2026, 53));
    }
}
