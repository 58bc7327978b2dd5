use calendar_core::{advance_date, advance_time, Calendar, CalendarError, Month};

fn two_months() -> Calendar {
    let mut calendar = Calendar::new("cal-1", "campaign-1", "Two Months");
    calendar.months = vec![Month::new("Frost", 30), Month::new("Thaw", 30)];
    calendar
}

fn set_date(calendar: &mut Calendar, year: i64, month: u32, day: u32) {
    calendar.current.year = year;
    calendar.current.month = month;
    calendar.current.day = day;
}

fn date(calendar: &Calendar) -> (i64, u32, u32) {
    (
        calendar.current.year,
        calendar.current.month,
        calendar.current.day,
    )
}

// ---------------------------------------------------------------------------
// advance_date
// ---------------------------------------------------------------------------

#[test]
fn advance_rolls_over_year_end() {
    let mut calendar = two_months();
    set_date(&mut calendar, 1, 2, 29);
    advance_date(&mut calendar, 2).unwrap();
    assert_eq!(date(&calendar), (2, 1, 1));
}

#[test]
fn advance_within_month() {
    let mut calendar = two_months();
    set_date(&mut calendar, 1, 1, 5);
    advance_date(&mut calendar, 10).unwrap();
    assert_eq!(date(&calendar), (1, 1, 15));
}

#[test]
fn advance_to_last_day_of_month_does_not_roll() {
    let mut calendar = two_months();
    set_date(&mut calendar, 1, 1, 1);
    advance_date(&mut calendar, 29).unwrap();
    assert_eq!(date(&calendar), (1, 1, 30));
}

#[test]
fn advance_many_years() {
    let mut calendar = two_months();
    set_date(&mut calendar, 1, 1, 1);
    advance_date(&mut calendar, 300).unwrap();
    assert_eq!(date(&calendar), (6, 1, 1));
}

#[test]
fn advance_zero_days_is_noop() {
    let mut calendar = two_months();
    set_date(&mut calendar, 3, 2, 7);
    let before = calendar.clone();
    advance_date(&mut calendar, 0).unwrap();
    assert_eq!(calendar, before);
}

#[test]
fn advance_without_months_is_rejected() {
    let mut calendar = Calendar::new("cal-1", "campaign-1", "Empty");
    let err = advance_date(&mut calendar, 1).unwrap_err();
    assert!(matches!(err, CalendarError::Validation(_)));
}

#[test]
fn advance_beyond_signed_range_is_rejected() {
    let mut calendar = two_months();
    set_date(&mut calendar, 1, 1, 1);
    let err = advance_date(&mut calendar, u64::MAX).unwrap_err();
    assert!(matches!(err, CalendarError::Validation(_)));
    assert_eq!(date(&calendar), (1, 1, 1));
}

#[test]
fn advance_past_last_representable_year_is_rejected() {
    let mut calendar = two_months();
    set_date(&mut calendar, i64::MAX, 2, 30);
    let err = advance_date(&mut calendar, 1).unwrap_err();
    assert!(matches!(err, CalendarError::Validation(_)));
    assert_eq!(date(&calendar), (i64::MAX, 2, 30));
}

#[test]
fn advance_counts_leap_day_in_leap_year() {
    let mut calendar = Calendar::new("cal-1", "campaign-1", "Leap");
    calendar.months = vec![
        Month::new("One", 10),
        Month {
            leap_year_days: 1,
            ..Month::new("Two", 10)
        },
    ];
    calendar.leap_year_every = 4;

    // Year 4 is a leap year: month 2 has 11 days.
    set_date(&mut calendar, 4, 2, 10);
    advance_date(&mut calendar, 1).unwrap();
    assert_eq!(date(&calendar), (4, 2, 11));
    advance_date(&mut calendar, 1).unwrap();
    assert_eq!(date(&calendar), (5, 1, 1));

    // Year 5 is not: day 10 is the last day.
    set_date(&mut calendar, 5, 2, 10);
    advance_date(&mut calendar, 1).unwrap();
    assert_eq!(date(&calendar), (6, 1, 1));
}

#[test]
fn advance_leaves_time_untouched() {
    let mut calendar = two_months();
    calendar.current.hour = 13;
    calendar.current.minute = 45;
    advance_date(&mut calendar, 40).unwrap();
    assert_eq!((calendar.current.hour, calendar.current.minute), (13, 45));
    assert_eq!(date(&calendar), (1, 2, 11));
}

// ---------------------------------------------------------------------------
// advance_time
// ---------------------------------------------------------------------------

#[test]
fn advance_time_carries_minutes_and_hours() {
    let mut calendar = two_months();
    set_date(&mut calendar, 1, 2, 30);
    calendar.current.hour = 23;
    calendar.current.minute = 50;

    advance_time(&mut calendar, 0, 15).unwrap();

    assert_eq!(date(&calendar), (2, 1, 1));
    assert_eq!((calendar.current.hour, calendar.current.minute), (0, 5));
}

#[test]
fn advance_time_multiple_days() {
    let mut calendar = two_months();
    calendar.current.hour = 6;
    advance_time(&mut calendar, 50, 0).unwrap();
    assert_eq!(date(&calendar), (1, 1, 3));
    assert_eq!((calendar.current.hour, calendar.current.minute), (8, 0));
}

#[test]
fn advance_time_respects_custom_units() {
    let mut calendar = two_months();
    calendar.hours_per_day = 10;
    calendar.minutes_per_hour = 100;
    calendar.current.hour = 9;
    calendar.current.minute = 90;

    advance_time(&mut calendar, 0, 20).unwrap();

    assert_eq!(date(&calendar), (1, 1, 2));
    assert_eq!((calendar.current.hour, calendar.current.minute), (0, 10));
}

#[test]
fn advance_time_zero_is_rejected() {
    let mut calendar = two_months();
    let err = advance_time(&mut calendar, 0, 0).unwrap_err();
    assert!(matches!(err, CalendarError::Validation(_)));
}

#[test]
fn advance_time_zero_units_is_rejected() {
    let mut calendar = two_months();
    calendar.minutes_per_hour = 0;
    assert!(advance_time(&mut calendar, 1, 0).is_err());
}

#[test]
fn advance_time_without_day_carry_works_on_empty_calendar() {
    let mut calendar = Calendar::new("cal-1", "campaign-1", "Empty");
    advance_time(&mut calendar, 2, 30).unwrap();
    assert_eq!((calendar.current.hour, calendar.current.minute), (2, 30));
}
