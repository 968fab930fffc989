//! Tests for cell value normalization.
//!
//! Covers the weekly schedule repair path end to end, including the
//! single-object weekday shape written by older grids.

use serde_json::{Value, json};
use tabula_model::{CellValue, ColumnType, DayEntry, EntryState, NO_CATEGORY, WeeklySchedule};
use tabula_normalize::{normalize, normalize_record_value, normalize_schedule, validate_pdf_upload};

fn schedule_of(value: CellValue) -> WeeklySchedule {
    match value {
        CellValue::WeeklySchedule(Some(schedule)) => schedule,
        other => panic!("expected a schedule, got {other:?}"),
    }
}

// =========================================================================
// Legacy Upgrade Tests
// =========================================================================

#[test]
fn test_legacy_schedule_is_upgraded() {
    let raw = json!({
        "monday": {"text": "x", "hours": 2, "minutes": 0},
        "tuesday": {},
        "wednesday": {},
        "thursday": {},
        "friday": {}
    });

    let schedule = schedule_of(normalize(ColumnType::WeeklySchedule, &raw));

    assert_eq!(schedule.monday.len(), 1);
    let entry = &schedule.monday[0];
    assert_eq!(entry.id, "legacy-monday");
    assert_eq!(entry.text, "x");
    assert_eq!(entry.hours, 2);
    assert_eq!(entry.minutes, 0);
    assert_eq!(entry.category, NO_CATEGORY);
    assert!(entry.is_confirmed);
    assert!(!entry.is_editing);
    assert_eq!(entry.state(), EntryState::Confirmed);

    assert!(schedule.tuesday.is_empty());
    assert_eq!(schedule.entry_count(), 1);
}

#[test]
fn test_legacy_upgrade_is_idempotent() {
    let raw = json!({"friday": {"text": "Review", "category": "Meeting", "minutes": 45}});

    let once = schedule_of(normalize(ColumnType::WeeklySchedule, &raw));
    let twice = schedule_of(normalize(ColumnType::WeeklySchedule, &once.to_json()));

    assert_eq!(once, twice);
    assert_eq!(twice.friday[0].category, "Meeting");
}

#[test]
fn test_mixed_legacy_and_list_days() {
    let raw = json!({
        "monday": [{"id": "a", "text": "kept", "isConfirmed": true, "isEditing": false}],
        "tuesday": {"hours": 1}
    });

    let schedule = normalize_schedule(&raw).unwrap();
    assert_eq!(schedule.monday[0].id, "a");
    assert_eq!(schedule.tuesday[0].id, "legacy-tuesday");
    assert_eq!(schedule.tuesday[0].hours, 1);
}

// =========================================================================
// Canonical Shape Tests
// =========================================================================

#[test]
fn test_max_duration_round_trips() {
    let mut entry = DayEntry::new("e1");
    entry.hours = 23;
    entry.minutes = 59;
    entry.is_confirmed = true;
    entry.is_editing = false;
    entry.last_edited_by = Some("Alice".into());
    entry.last_edited_at = Some("2024-03-01T10:00:00+00:00".into());

    let mut schedule = WeeklySchedule::default();
    schedule.wednesday.push(entry);
    let value = CellValue::WeeklySchedule(Some(schedule));

    assert_eq!(normalize(ColumnType::WeeklySchedule, &value.to_json()), value);
}

#[test]
fn test_stale_select_value_is_kept() {
    // The option list may have changed since the cell was written.
    let value = normalize(ColumnType::Select, &json!("archived"));
    assert_eq!(value, CellValue::Select("archived".into()));
}

#[test]
fn test_type_change_reinterprets_stored_value() {
    let stored = json!("true");
    assert_eq!(normalize(ColumnType::Checkbox, &stored), CellValue::Checkbox(true));
    assert_eq!(normalize(ColumnType::Text, &stored), CellValue::Text("true".into()));
    assert_eq!(
        normalize(ColumnType::WeeklySchedule, &stored),
        CellValue::WeeklySchedule(None)
    );
}

#[test]
fn test_missing_record_uses_type_default() {
    assert_eq!(
        normalize_record_value(ColumnType::PdfUpload, None),
        CellValue::PdfUpload(None)
    );
    assert_eq!(
        normalize_record_value(ColumnType::CalendarWeeks, Some(&Value::Null)),
        CellValue::CalendarWeeks(String::new())
    );
}

// =========================================================================
// Upload Check Tests
// =========================================================================

#[test]
fn test_rejected_upload_messages() {
    let check = validate_pdf_upload("scan.png", "image/png", b"\x89PNG");
    let messages: Vec<String> = check.issues.iter().map(ToString::to_string).collect();
    insta::assert_snapshot!(messages.join("\n"), @r"
    only PDF files are allowed, got 'image/png'
    file name 'scan.png' must end with .pdf
    file content is not a PDF document
    ");
}
