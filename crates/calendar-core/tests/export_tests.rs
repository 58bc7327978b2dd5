//! Chronicle export, and round trips from foreign formats through the native schema.

use calendar_core::export::{to_json, to_json_pretty, CHRONICLE_VERSION};
use calendar_core::{
    export_calendar, parse_import, Calendar, CalendarMode, DateKey, Event, ImportFormat,
    ImportResult, Month, Moon, RecurrenceType, Visibility, Weekday,
};

fn calendar_from(import: &ImportResult) -> Calendar {
    let mut calendar = Calendar::new("cal-1", "campaign-1", import.calendar_name.clone());
    calendar.months = import.months.clone();
    calendar.weekdays = import.weekdays.clone();
    calendar.moons = import.moons.clone();
    calendar.seasons = import.seasons.clone();
    calendar.eras = import.eras.clone();
    calendar.leap_year_every = import.settings.leap_year_every;
    calendar.leap_year_offset = import.settings.leap_year_offset;
    calendar.current.year = import.settings.current_year;
    calendar
}

fn assert_round_trip(source: &str) {
    let imported = parse_import(source.as_bytes()).unwrap();
    let calendar = calendar_from(&imported);
    let json = to_json(&export_calendar(&calendar, None)).unwrap();
    let reimported = parse_import(json.as_bytes()).unwrap();

    assert_eq!(reimported.format, ImportFormat::Chronicle);
    assert_eq!(reimported.months, imported.months);
    assert_eq!(reimported.weekdays, imported.weekdays);
    assert_eq!(reimported.moons, imported.moons);
    assert_eq!(reimported.seasons, imported.seasons);
    assert_eq!(reimported.settings.leap_year_every, imported.settings.leap_year_every);
}

fn sample_calendar() -> Calendar {
    let mut calendar = Calendar::new("cal-1", "campaign-1", "Greyhawk");
    calendar.epoch_name = Some("CY".to_string());
    calendar.months = vec![Month::new("Fireseek", 28), Month::new("Readying", 28)];
    calendar.weekdays = vec![
        Weekday {
            name: "Starday".to_string(),
            sort_order: 0,
        },
        Weekday {
            name: "Sunday".to_string(),
            sort_order: 1,
        },
    ];
    calendar.moons = vec![Moon {
        name: "Luna".to_string(),
        cycle_days: 28.0,
        phase_offset: 4.0,
        color: "#dddddd".to_string(),
    }];
    calendar.current.year = 576;
    calendar.current.month = 2;
    calendar.current.day = 3;
    calendar
}

fn festival(calendar: &Calendar) -> Event {
    Event {
        id: "evt-1".to_string(),
        calendar_id: calendar.id.clone(),
        entity_id: None,
        name: "Growfest".to_string(),
        description: None,
        start: DateKey::new(576, 1, 1),
        start_hour: None,
        start_minute: None,
        end: Some(DateKey::new(576, 1, 7)),
        end_hour: None,
        end_minute: None,
        recurrence: Some(RecurrenceType::Yearly),
        visibility: Visibility::Everyone,
        category: Some("festival".to_string()),
        color: None,
    }
}

// ---------------------------------------------------------------------------
// Export shape
// ---------------------------------------------------------------------------

#[test]
fn export_writes_format_id_and_version() {
    let document = export_calendar(&sample_calendar(), None);
    let json: serde_json::Value = serde_json::from_str(&to_json(&document).unwrap()).unwrap();

    assert_eq!(json["format"], "chronicle-calendar-v1");
    assert_eq!(json["version"], CHRONICLE_VERSION);
    assert_eq!(json["calendar"]["name"], "Greyhawk");
    assert_eq!(json["calendar"]["mode"], "fantasy");
    assert_eq!(json["calendar"]["current_year"], 576);
    assert_eq!(json["calendar"]["months"].as_array().unwrap().len(), 2);
    assert!(json.get("events").is_none());
}

#[test]
fn export_includes_events_when_requested() {
    let calendar = sample_calendar();
    let events = vec![festival(&calendar)];
    let document = export_calendar(&calendar, Some(events.as_slice()));
    let json: serde_json::Value = serde_json::from_str(&to_json_pretty(&document).unwrap()).unwrap();

    let exported = &json["events"][0];
    assert_eq!(exported["name"], "Growfest");
    assert_eq!(exported["end_day"], 7);
    assert_eq!(exported["recurrence_type"], "yearly");
    assert_eq!(exported["visibility"], "everyone");
}

#[test]
fn export_with_empty_events_keeps_the_key() {
    let document = export_calendar(&sample_calendar(), Some(&[][..]));
    let json: serde_json::Value = serde_json::from_str(&to_json(&document).unwrap()).unwrap();
    assert_eq!(json["events"], serde_json::json!([]));
}

// ---------------------------------------------------------------------------
// Chronicle import
// ---------------------------------------------------------------------------

#[test]
fn chronicle_export_reimports_exactly() {
    let mut calendar = sample_calendar();
    calendar.mode = CalendarMode::RealLife;
    calendar.leap_year_every = 4;
    let events = vec![festival(&calendar)];

    let json = to_json(&export_calendar(&calendar, Some(events.as_slice()))).unwrap();
    let result = parse_import(json.as_bytes()).unwrap();

    assert_eq!(result.calendar_name, "Greyhawk");
    assert_eq!(result.months, calendar.months);
    assert_eq!(result.weekdays, calendar.weekdays);
    assert_eq!(result.moons, calendar.moons);
    assert_eq!(result.settings.mode, Some(CalendarMode::RealLife));
    assert_eq!(result.settings.epoch_name.as_deref(), Some("CY"));
    assert_eq!(result.settings.current_year, 576);
    assert_eq!(result.settings.leap_year_every, 4);
    assert_eq!(result.events, vec![events[0].to_input()]);
}

#[test]
fn chronicle_lists_are_ordered_by_sort_order() {
    let doc = r#"{
        "format": "chronicle-calendar-v1",
        "calendar": {
            "name": "Shuffled",
            "months": [
                {"name": "Second", "days": 10, "sort_order": 5},
                {"name": "First", "days": 10, "sort_order": 2}
            ]
        }
    }"#;
    let result = parse_import(doc.as_bytes()).unwrap();
    assert_eq!(result.months[0].name, "First");
    assert_eq!(result.months[0].sort_order, 0);
    assert_eq!(result.months[1].sort_order, 1);
    assert_eq!(result.settings.hours_per_day, 24);
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn simple_calendar_round_trip() {
    assert_round_trip(
        r#"{"calendar": {
            "name": "Harptos",
            "months": [
                {"name": "Hammer", "numberOfDays": 30, "numberOfLeapYearDays": 31},
                {"name": "Alturiak", "numberOfDays": 30}
            ],
            "weekdays": [{"name": "One"}, {"name": "Two"}],
            "moons": [{"name": "Selune", "cycleLength": 30.5, "cycleDayAdjust": 1}],
            "seasons": [{"name": "Winter", "startingMonth": 0, "startingDay": 0}],
            "leapYear": {"rule": "gregorian"}
        }}"#,
    );
}

#[test]
fn calendaria_round_trip() {
    assert_round_trip(
        r#"{
            "days": {"values": {"a": {"name": "Mon"}, "b": {"name": "Tue", "ordinal": 1}}, "hoursPerDay": 24},
            "months": {"values": {"m": {"name": "Only", "days": 40, "leapDays": 41}}},
            "moons": {"values": {"x": {"name": "Pale", "cycleLength": 12}}},
            "years": {"leapYear": {"leapInterval": 5, "leapStart": 1}}
        }"#,
    );
}

#[test]
fn fantasy_calendar_round_trip() {
    assert_round_trip(
        r#"{
            "static_data": {
                "year_data": {
                    "global_week": ["Sul", "Mol"],
                    "timespans": [{"name": "A", "length": 20}, {"name": "B", "length": 20}],
                    "leap_days": [{"timespan": 1, "interval": "3"}]
                },
                "moons": [{"name": "Catha", "cycle": 33, "shift": 2}],
                "seasons": {"data": [{"name": "Hot"}, {"name": "Cold"}]}
            },
            "dynamic_data": {"year": 12}
        }"#,
    );
}
