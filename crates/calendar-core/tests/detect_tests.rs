use calendar_core::detect::{detect_value, require_known};
use calendar_core::{detect_format, CalendarError, ErrorKind, ImportFormat};
use serde_json::json;

fn detect(s: &str) -> ImportFormat {
    detect_format(s.as_bytes()).unwrap()
}

// ---------------------------------------------------------------------------
// Fingerprints
// ---------------------------------------------------------------------------

#[test]
fn chronicle_by_format_id() {
    assert_eq!(
        detect(r#"{"format":"chronicle-calendar-v1","calendar":{}}"#),
        ImportFormat::Chronicle
    );
}

#[test]
fn other_format_string_is_not_chronicle() {
    assert_eq!(detect(r#"{"format":"something-else"}"#), ImportFormat::Unknown);
}

#[test]
fn simple_calendar_v1_by_calendar_key() {
    assert_eq!(detect(r#"{"calendar":{"months":[]}}"#), ImportFormat::SimpleCalendar);
}

#[test]
fn simple_calendar_v2_by_export_version() {
    assert_eq!(
        detect(r#"{"exportVersion":2,"calendars":[{"id":"x"}]}"#),
        ImportFormat::SimpleCalendar
    );
}

#[test]
fn export_version_without_calendar_array_is_unknown() {
    assert_eq!(
        detect(r#"{"exportVersion":2,"calendars":{"id":"x"}}"#),
        ImportFormat::Unknown
    );
}

#[test]
fn fantasy_calendar_needs_both_sections() {
    assert_eq!(
        detect(r#"{"static_data":{},"dynamic_data":{}}"#),
        ImportFormat::FantasyCalendar
    );
    assert_eq!(detect(r#"{"static_data":{}}"#), ImportFormat::Unknown);
}

#[test]
fn calendaria_by_days_clock() {
    assert_eq!(
        detect(r#"{"days":{"hoursPerDay":24,"values":{}}}"#),
        ImportFormat::Calendaria
    );
}

#[test]
fn calendaria_by_months_object() {
    assert_eq!(
        detect(r#"{"name":"Harptos","months":{"values":{}}}"#),
        ImportFormat::Calendaria
    );
    assert_eq!(detect(r#"{"months":{"m1":{}}}"#), ImportFormat::Calendaria);
}

#[test]
fn months_array_alone_is_unknown() {
    assert_eq!(detect(r#"{"months":[{"name":"A"}]}"#), ImportFormat::Unknown);
}

#[test]
fn empty_object_is_unknown() {
    assert_eq!(detect("{}"), ImportFormat::Unknown);
}

#[test]
fn non_object_json_is_unknown() {
    assert_eq!(detect("[1, 2, 3]"), ImportFormat::Unknown);
    assert_eq!(detect("\"calendar\""), ImportFormat::Unknown);
    assert_eq!(detect("null"), ImportFormat::Unknown);
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[test]
fn chronicle_wins_over_calendar_key() {
    let doc = json!({"format": "chronicle-calendar-v1", "calendar": {}, "static_data": {}, "dynamic_data": {}});
    assert_eq!(detect_value(&doc), ImportFormat::Chronicle);
}

#[test]
fn calendar_key_wins_over_fantasy_calendar() {
    let doc = json!({"calendar": {}, "static_data": {}, "dynamic_data": {}});
    assert_eq!(detect_value(&doc), ImportFormat::SimpleCalendar);
}

#[test]
fn fantasy_calendar_wins_over_calendaria() {
    let doc = json!({"static_data": {}, "dynamic_data": {}, "months": {}});
    assert_eq!(detect_value(&doc), ImportFormat::FantasyCalendar);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn invalid_json_is_decode_error() {
    let err = detect_format(b"{not json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn require_known_lists_supported_formats() {
    let err = require_known(&json!({"hello": "world"})).unwrap_err();
    assert!(matches!(err, CalendarError::UnrecognizedFormat));
    let message = err.to_string();
    for name in ["Chronicle", "Simple Calendar", "Calendaria", "Fantasy-Calendar.com"] {
        assert!(message.contains(name), "{message} should mention {name}");
    }
}

#[test]
fn format_names_display() {
    assert_eq!(ImportFormat::FantasyCalendar.to_string(), "Fantasy-Calendar.com");
    assert_eq!(ImportFormat::SimpleCalendar.name(), "Simple Calendar");
}
