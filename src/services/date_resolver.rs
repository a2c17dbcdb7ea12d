//! 复习日期计算

use chrono::{Days, NaiveDate};

use crate::error::{AppError, Result};

/// 计算 `anchor + interval_days`（按日历日）
pub fn resolve(interval_days: i64, anchor: NaiveDate) -> Result<NaiveDate> {
    let days = Days::new(interval_days.unsigned_abs());
    let resolved = if interval_days >= 0 {
        anchor.checked_add_days(days)
    } else {
        anchor.checked_sub_days(days)
    };

    resolved.ok_or_else(|| {
        AppError::Validation(format!(
            "{} + {} days is outside the supported calendar",
            anchor, interval_days
        ))
    })
}

/// 从 `now` 到 `date` 的带符号天数
pub fn days_between(now: NaiveDate, date: NaiveDate) -> i64 {
    date.signed_duration_since(now).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_crosses_month_and_leap_day() {
        assert_eq!(resolve(15, date(2024, 2, 20)).unwrap(), date(2024, 3, 6));
        assert_eq!(resolve(1, date(2024, 2, 28)).unwrap(), date(2024, 2, 29));
        assert_eq!(resolve(365, date(2023, 1, 1)).unwrap(), date(2024, 1, 1));
    }

    #[test]
    fn test_resolve_negative_and_zero() {
        assert_eq!(resolve(0, date(2024, 1, 1)).unwrap(), date(2024, 1, 1));
        assert_eq!(resolve(-1, date(2024, 1, 1)).unwrap(), date(2023, 12, 31));
    }

    #[test]
    fn test_resolve_out_of_range() {
        assert!(resolve(i64::MAX, date(2024, 1, 1)).is_err());
        assert!(resolve(1, NaiveDate::MAX).is_err());
    }

    #[test]
    fn test_iso_format() {
        assert_eq!(resolve(15, date(2024, 1, 1)).unwrap().to_string(), "2024-01-16");
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between(date(2024, 1, 10), date(2024, 1, 25)), 15);
        assert_eq!(days_between(date(2024, 1, 10), date(2024, 1, 8)), -2);
    }
}
