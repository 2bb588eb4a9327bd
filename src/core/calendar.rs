//! Business-day arithmetic for invoice and movement due dates.

use crate::config::settings::BillingSettings;
use chrono::{Datelike, NaiveDate, Weekday};

/// Returns true for Saturdays and Sundays.
#[must_use]
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Advances `start` by `days` business days, skipping weekends.
///
/// The walk moves one calendar day at a time and only counts weekdays, so a start
/// on a Friday plus one business day lands on the following Monday. `days == 0`
/// returns `start` unchanged, even when `start` falls on a weekend.
#[must_use]
pub fn add_business_days(start: NaiveDate, days: u32) -> NaiveDate {
    let mut date = start;
    let mut remaining = days;

    while remaining > 0 {
        let Some(next) = date.succ_opt() else {
            break;
        };
        date = next;
        if !is_weekend(date) {
            remaining -= 1;
        }
    }

    date
}

/// Due date for a document issued on `issued_on` under the configured billing rules.
#[must_use]
pub fn due_date(issued_on: NaiveDate, billing: &BillingSettings) -> NaiveDate {
    add_business_days(issued_on, billing.due_business_days)
}
