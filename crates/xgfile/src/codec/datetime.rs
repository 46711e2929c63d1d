//! Delphi `TDateTime` conversion
//!
//! A `TDateTime` is a double: the integer part counts whole days since
//! 1899-12-30 00:00 UTC, the fractional part is the elapsed fraction of that
//! day. Seconds are truncated toward zero.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Day zero of the Delphi calendar, 1899-12-30 00:00:00 UTC
pub fn delphi_epoch() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

/// Convert a `TDateTime` value to UTC
///
/// Returns `None` for non-finite values or dates chrono cannot represent.
pub fn delphi_datetime(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let days = value.trunc();
    let seconds = ((value - days) * SECONDS_PER_DAY).trunc();

    // chrono's range is roughly +/- 262,000 years
    if days.abs() > 90_000_000.0 {
        return None;
    }

    delphi_epoch()
        .checked_add_signed(TimeDelta::try_days(days as i64)?)?
        .checked_add_signed(TimeDelta::try_seconds(seconds as i64)?)
}
