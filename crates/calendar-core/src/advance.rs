//! Date/time advancement -- deterministic rollover of a calendar's current date.
//!
//! Day rollover walks month by month instead of day by day: each step jumps to
//! the first day of the next month and consumes the days in between, so the cost
//! is proportional to the number of months crossed. The result is identical to
//! incrementing the day counter `days` times, including the leap-year length of
//! every month crossed.

use tracing::debug;

use crate::error::{CalendarError, Result};
use crate::model::Calendar;

/// Move the current date forward by `days`, rolling over months and years.
///
/// `days == 0` leaves the calendar untouched. Hour and minute are not changed.
///
/// # Errors
/// Returns `CalendarError::Validation` if the calendar has no months or the
/// year would run past the largest representable year.
pub fn advance_date(calendar: &mut Calendar, days: u64) -> Result<()> {
    if days == 0 {
        return Ok(());
    }
    if calendar.months.is_empty() {
        return Err(CalendarError::validation(
            "cannot advance a calendar without months",
        ));
    }

    let month_count = calendar.months.len();
    let mut year = calendar.current.year;
    let mut month_idx = (calendar.current.month as usize).saturating_sub(1);
    let mut day = calendar.current.day as i64;
    let mut remaining = i64::try_from(days)
        .map_err(|_| CalendarError::validation(format!("cannot advance by {} days", days)))?;

    while remaining > 0 {
        let month_len = calendar.month_days(month_idx, year) as i64;
        if remaining <= month_len - day {
            day += remaining;
            break;
        }

        // Days needed to reach day 1 of the following month. A day already past
        // the end of its month (e.g. after the month list shrank) rolls over in one.
        remaining -= (month_len - day).max(0) + 1;
        day = 1;
        month_idx += 1;
        if month_idx >= month_count {
            month_idx = 0;
            year = year
                .checked_add(1)
                .ok_or_else(|| CalendarError::validation("year overflow while advancing"))?;
        }
    }

    debug!(
        from_year = calendar.current.year,
        from_month = calendar.current.month,
        from_day = calendar.current.day,
        to_year = year,
        to_month = month_idx + 1,
        to_day = day,
        days,
        "advanced date"
    );

    calendar.current.year = year;
    calendar.current.month = month_idx as u32 + 1;
    calendar.current.day = day as u32;
    Ok(())
}

/// Move the current time forward, carrying minutes into hours and hours into days.
///
/// # Errors
/// Returns `CalendarError::Validation` if both `hours` and `minutes` are zero,
/// if the calendar's time units are zero, or if a day carry is needed on a
/// calendar without months.
pub fn advance_time(calendar: &mut Calendar, hours: u64, minutes: u64) -> Result<()> {
    if hours == 0 && minutes == 0 {
        return Err(CalendarError::validation(
            "must advance by at least one hour or minute",
        ));
    }
    let minutes_per_hour = calendar.minutes_per_hour as u64;
    let hours_per_day = calendar.hours_per_day as u64;
    if minutes_per_hour == 0 || hours_per_day == 0 {
        return Err(CalendarError::validation(
            "hours_per_day and minutes_per_hour must be positive",
        ));
    }

    let total_minutes = (calendar.current.minute as u64).saturating_add(minutes);
    let carry_hours = total_minutes / minutes_per_hour;
    let minute = total_minutes % minutes_per_hour;

    let total_hours = (calendar.current.hour as u64)
        .saturating_add(hours)
        .saturating_add(carry_hours);
    let carry_days = total_hours / hours_per_day;
    let hour = total_hours % hours_per_day;

    // Roll the date first so a failure leaves the clock untouched as well.
    advance_date(calendar, carry_days)?;

    calendar.current.hour = hour as u32;
    calendar.current.minute = minute as u32;
    Ok(())
}
