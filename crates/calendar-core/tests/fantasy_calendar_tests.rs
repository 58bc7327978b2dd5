use calendar_core::import::fantasy_calendar;
use calendar_core::{parse_import, ErrorKind, ImportFormat};
use serde_json::{json, Value};

fn exandria() -> Value {
    json!({
        "name": "Exandria",
        "static_data": {
            "year_data": {
                "global_week": ["Miresen", "Grissen"],
                "timespans": [
                    {"name": "Horisal", "type": "month", "length": 29},
                    {"name": "Festival", "type": "intercalary", "length": 1},
                    {"name": "Misuthar", "type": "month", "length": 30}
                ],
                "leap_days": [
                    {"timespan": 0, "interval": "400,!100,4", "offset": 1},
                    {"timespan": 0, "interval": "400,!100,4", "offset": 1}
                ]
            },
            "moons": [{"name": "Catha", "cycle": 33, "shift": 3, "color": "#aabbcc"}],
            "clock": {"hours": 20, "minutes": 40},
            "seasons": {
                "data": [
                    {"name": "Warm", "color": ["#ff0000", "#00ff00"]},
                    {"name": "Cold", "color": "#0000ff"}
                ]
            },
            "eras": [{"name": "Founding", "description": "", "date": {"year": 812}}]
        },
        "dynamic_data": {"year": 836}
    })
}

fn parse(doc: &Value) -> calendar_core::ImportResult {
    parse_import(doc.to_string().as_bytes()).unwrap()
}

// ---------------------------------------------------------------------------
// Timespans and leap days
// ---------------------------------------------------------------------------

#[test]
fn timespans_become_months() {
    let result = parse(&exandria());

    assert_eq!(result.format, ImportFormat::FantasyCalendar);
    assert_eq!(result.calendar_name, "Exandria");
    let lengths: Vec<i32> = result.months.iter().map(|m| m.days).collect();
    assert_eq!(lengths, [29, 1, 30]);
    assert!(result.months[1].is_intercalary);
    assert!(!result.months[0].is_intercalary);
}

#[test]
fn leap_days_are_tallied_per_timespan() {
    let result = parse(&exandria());
    assert_eq!(result.months[0].leap_year_days, 2);
    assert_eq!(result.months[2].leap_year_days, 0);
    assert_eq!(result.settings.leap_year_every, 4);
    assert_eq!(result.settings.leap_year_offset, 1);
}

#[test]
fn leap_day_pointing_nowhere_is_ignored() {
    let mut doc = exandria();
    doc["static_data"]["year_data"]["leap_days"] = json!([{"timespan": 9, "interval": "4"}]);
    let result = parse(&doc);
    assert!(result.months.iter().all(|m| m.leap_year_days == 0));
}

#[test]
fn week_moons_clock_and_eras() {
    let result = parse(&exandria());

    assert_eq!(
        result.weekdays.iter().map(|w| w.name.as_str()).collect::<Vec<_>>(),
        ["Miresen", "Grissen"]
    );
    assert_eq!(result.moons[0].cycle_days, 33.0);
    assert_eq!(result.moons[0].phase_offset, 3.0);
    assert_eq!(result.settings.hours_per_day, 20);
    assert_eq!(result.settings.minutes_per_hour, 40);
    assert_eq!(result.settings.current_year, 836);
    assert_eq!(result.eras[0].start_year, 812);
    assert_eq!(result.eras[0].description, None);
}

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

#[test]
fn dateless_seasons_split_the_year_evenly() {
    let result = parse(&exandria());
    let warm = &result.seasons[0];
    let cold = &result.seasons[1];

    // 60-day year: days 1..=30 and 31..=60.
    assert_eq!((warm.start_month, warm.start_day), (1, 1));
    assert_eq!((warm.end_month, warm.end_day), (2, 1));
    assert_eq!(warm.color, "#ff0000");
    assert_eq!((cold.start_month, cold.start_day), (3, 1));
    assert_eq!((cold.end_month, cold.end_day), (3, 30));
    assert_eq!(cold.color, "#0000ff");
}

#[test]
fn leftover_days_go_to_earliest_seasons() {
    let doc = json!({
        "static_data": {
            "year_data": {"timespans": [{"name": "Only", "length": 10}]},
            "seasons": {"data": [{"name": "A"}, {"name": "B"}, {"name": "C"}]}
        },
        "dynamic_data": {}
    });
    let result = fantasy_calendar::parse(&doc).unwrap();
    let ranges: Vec<(u32, u32)> = result
        .seasons
        .iter()
        .map(|s| (s.start_day, s.end_day))
        .collect();
    assert_eq!(ranges, [(1, 4), (5, 7), (8, 10)]);
    assert_eq!(result.settings.current_year, 1);
}

#[test]
fn explicit_season_starts_are_used_when_complete() {
    let mut doc = exandria();
    doc["static_data"]["seasons"] = json!({"data": [
        {"name": "Early", "timespan": 0, "day": 1},
        {"name": "Late", "timespan": 2, "day": 5}
    ]});
    let result = parse(&doc);
    let early = &result.seasons[0];
    let late = &result.seasons[1];

    assert_eq!((early.start_month, early.start_day), (1, 1));
    assert_eq!((early.end_month, early.end_day), (3, 4));
    assert_eq!((late.start_month, late.start_day), (3, 5));
    assert_eq!((late.end_month, late.end_day), (3, 30));
}

#[test]
fn explicit_season_in_missing_timespan_is_decode_error() {
    let mut doc = exandria();
    doc["static_data"]["seasons"] = json!({"data": [
        {"name": "Early", "timespan": 0, "day": 1},
        {"name": "Lost", "timespan": 4294967295u64, "day": 1}
    ]});
    let err = parse_import(doc.to_string().as_bytes()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().contains("Lost"));
}

#[test]
fn explicit_season_day_past_timespan_end_is_decode_error() {
    let mut doc = exandria();
    doc["static_data"]["seasons"] = json!({"data": [
        {"name": "Early", "timespan": 0, "day": 1},
        {"name": "Late", "timespan": 1, "day": 2}
    ]});
    let err = parse_import(doc.to_string().as_bytes()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn no_timespans_is_an_error() {
    let doc = json!({"static_data": {}, "dynamic_data": {}});
    assert!(fantasy_calendar::parse(&doc).is_err());
}
