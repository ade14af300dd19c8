//! Pure calendar arithmetic for payment dates.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::FinanceError;
use crate::FinanceResult;

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> FinanceResult<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .ok_or_else(|| FinanceError::DateError(format!("No such month: {year}-{month:02}")))
}

/// The date `months` calendar months after `date`, on `day` of the target
/// month, clamped to the month's last day when `day` does not exist there.
pub fn add_months(date: NaiveDate, months: u32, day: u32) -> FinanceResult<NaiveDate> {
    let index = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(months);
    let year = i32::try_from(index.div_euclid(12))
        .map_err(|_| FinanceError::DateError(format!("{date} + {months} months is out of range")))?;
    let month = (index.rem_euclid(12) + 1) as u32;
    let last_day = days_in_month(year, month)?;
    let target_day = day.clamp(1, last_day);
    if target_day < day {
        tracing::trace!(year, month, day, target_day, "payment day clamped to month end");
    }
    NaiveDate::from_ymd_opt(year, month, target_day)
        .ok_or_else(|| FinanceError::DateError(format!("{date} + {months} months is out of range")))
}

/// Parse an ISO `YYYY-MM-DD` date, naming the offending field on failure.
pub fn parse_iso_date(field: &str, value: &str) -> FinanceResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| FinanceError::InvalidInput {
        field: field.to_string(),
        reason: format!("'{value}' is not an ISO date: {e}"),
    })
}

/// Monthly payment dates anchored on the first payment.
///
/// Every date is derived from the anchor rather than from the previous
/// payment, so a day-31 schedule returns to the 31st after a short month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCalendar {
    first_payment: NaiveDate,
    payment_day: u32,
}

impl PaymentCalendar {
    /// Build the calendar for a loan starting on `start`.
    ///
    /// Without a preferred day the first payment falls on the start date.
    /// With one, the first payment is the earliest date on or after `start`
    /// that falls on the preferred day (clamped for short months).
    pub fn new(start: NaiveDate, preferred_day: Option<u32>) -> FinanceResult<Self> {
        let Some(day) = preferred_day else {
            return Ok(PaymentCalendar {
                first_payment: start,
                payment_day: start.day(),
            });
        };
        if !(1..=31).contains(&day) {
            return Err(FinanceError::invalid_input(
                "preferred_payment_day",
                format!("Payment day must be between 1 and 31, got {day}"),
            ));
        }
        let this_month = add_months(start, 0, day)?;
        let first_payment = if this_month < start {
            add_months(start, 1, day)?
        } else {
            this_month
        };
        Ok(PaymentCalendar {
            first_payment,
            payment_day: day,
        })
    }

    pub fn first_payment(&self) -> NaiveDate {
        self.first_payment
    }

    /// Payment date of the 1-based `period`.
    pub fn date_of(&self, period: u32) -> FinanceResult<NaiveDate> {
        add_months(self.first_payment, period.saturating_sub(1), self.payment_day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2).unwrap(), 29);
        assert_eq!(days_in_month(2023, 2).unwrap(), 28);
        assert_eq!(days_in_month(2024, 12).unwrap(), 31);
        assert!(days_in_month(2024, 13).is_err());
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        assert_eq!(add_months(ymd(2024, 1, 31), 1, 31).unwrap(), ymd(2024, 2, 29));
        assert_eq!(add_months(ymd(2023, 1, 31), 1, 31).unwrap(), ymd(2023, 2, 28));
        assert_eq!(add_months(ymd(2024, 1, 31), 3, 31).unwrap(), ymd(2024, 4, 30));
    }

    #[test]
    fn test_add_months_crosses_year() {
        assert_eq!(add_months(ymd(2024, 11, 15), 3, 15).unwrap(), ymd(2025, 2, 15));
        assert_eq!(add_months(ymd(2024, 1, 1), 360, 1).unwrap(), ymd(2054, 1, 1));
    }

    #[test]
    fn test_calendar_returns_to_day_31_after_february() {
        let cal = PaymentCalendar::new(ymd(2024, 1, 31), None).unwrap();
        assert_eq!(cal.date_of(1).unwrap(), ymd(2024, 1, 31));
        assert_eq!(cal.date_of(2).unwrap(), ymd(2024, 2, 29));
        assert_eq!(cal.date_of(3).unwrap(), ymd(2024, 3, 31));
    }

    #[test]
    fn test_preferred_day_later_in_start_month() {
        let cal = PaymentCalendar::new(ymd(2024, 3, 10), Some(15)).unwrap();
        assert_eq!(cal.first_payment(), ymd(2024, 3, 15));
    }

    #[test]
    fn test_preferred_day_already_passed_moves_to_next_month() {
        let cal = PaymentCalendar::new(ymd(2024, 1, 20), Some(31)).unwrap();
        assert_eq!(cal.first_payment(), ymd(2024, 1, 31));
        let cal = PaymentCalendar::new(ymd(2024, 1, 20), Some(5)).unwrap();
        assert_eq!(cal.first_payment(), ymd(2024, 2, 5));
        assert_eq!(cal.date_of(2).unwrap(), ymd(2024, 3, 5));
    }

    #[test]
    fn test_preferred_day_out_of_range() {
        assert!(PaymentCalendar::new(ymd(2024, 1, 1), Some(0)).is_err());
        assert!(PaymentCalendar::new(ymd(2024, 1, 1), Some(32)).is_err());
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(parse_iso_date("start_date", "2024-02-29").unwrap(), ymd(2024, 2, 29));
        let err = parse_iso_date("start_date", "2023-02-29").unwrap_err();
        assert!(err.to_string().contains("start_date"));
        assert!(parse_iso_date("start_date", "29/02/2024").is_err());
    }
}
