//! Tests for the weekly schedule editor session and its totals.

use serde_json::json;
use tabula_model::{
    AccessLevel, CellValue, ColumnType, EntryState, Identity, TableBackend, TableMode, Weekday,
};
use tabula_normalize::normalize;
use tabula_state::{
    EntryField, GridConfig, ScheduleEditor, ScheduleSummary, TableView, cell_choices,
};
use tabula_store::{MemoryBackend, TableSet};

fn actor() -> Option<Identity> {
    Some(Identity::new("jdoe", "Jane Doe"))
}

fn schedule_of(value: &CellValue) -> &tabula_model::WeeklySchedule {
    match value {
        CellValue::WeeklySchedule(Some(schedule)) => schedule,
        other => panic!("expected a schedule, got {other:?}"),
    }
}

// =========================================================================
// Aggregation Tests
// =========================================================================

#[test]
fn test_confirmed_only_aggregation() {
    let mut editor = ScheduleEditor::open(None, &[], actor());
    let done = editor.add_entry(Weekday::Monday);
    editor
        .update_field(Weekday::Monday, &done, EntryField::Hours(1))
        .unwrap();
    editor
        .update_field(Weekday::Monday, &done, EntryField::Minutes(30))
        .unwrap();
    editor.confirm(Weekday::Monday, &done).unwrap();

    let open = editor.add_entry(Weekday::Monday);
    editor
        .update_field(Weekday::Monday, &open, EntryField::Hours(3))
        .unwrap();

    let summary = ScheduleSummary::of(editor.schedule());
    assert_eq!(summary.total_minutes(), 90);
    assert_eq!(summary.confirmed_entries(), 1);
    insta::assert_snapshot!(summary.cell_label(), @"Woche: 1:30");
}

#[test]
fn test_legacy_entry_counts_once() {
    let value = normalize(
        ColumnType::WeeklySchedule,
        &json!({"thursday": {"text": "Standup", "minutes": 15}}),
    );
    let summary = ScheduleSummary::of_value(&value).unwrap();
    assert_eq!(summary.confirmed_entries(), 1);
    insta::assert_snapshot!(summary.cell_label(), @"Woche: 0:15");
}

// =========================================================================
// Save / Cancel Tests
// =========================================================================

#[test]
fn test_cancel_returns_original_value() {
    let original = normalize(
        ColumnType::WeeklySchedule,
        &json!({"monday": [{"id": "a", "text": "keep", "hours": 2, "isConfirmed": true, "isEditing": false}]}),
    );
    let mut editor = ScheduleEditor::open(Some(schedule_of(&original)), &[], actor());
    editor.delete(Weekday::Monday, "a").unwrap();
    editor.add_entry(Weekday::Tuesday);

    assert_eq!(editor.cancel(), original);
}

#[test]
fn test_save_keeps_only_confirmed_content() {
    let original = normalize(
        ColumnType::WeeklySchedule,
        &json!({"monday": [{"id": "a", "text": "v1", "hours": 1, "isConfirmed": true, "isEditing": false}]}),
    );
    let mut editor = ScheduleEditor::open(Some(schedule_of(&original)), &[], actor());

    // Reopen the confirmed entry and change it without confirming.
    editor.edit(Weekday::Monday, "a").unwrap();
    editor
        .update_field(Weekday::Monday, "a", EntryField::Text("v2".into()))
        .unwrap();
    // A new entry that is never confirmed.
    editor.add_entry(Weekday::Monday);
    // A new entry that is confirmed.
    let fresh = editor.add_entry(Weekday::Friday);
    editor.confirm(Weekday::Friday, &fresh).unwrap();

    let saved = editor.save();
    let schedule = schedule_of(&saved);
    assert_eq!(schedule.monday.len(), 1);
    assert_eq!(schedule.monday[0].text, "v1");
    assert_eq!(schedule.monday[0].state(), EntryState::Confirmed);
    assert_eq!(schedule.friday.len(), 1);
    assert_eq!(schedule.friday[0].last_edited_by.as_deref(), Some("Jane Doe"));
}

#[test]
fn test_saved_value_round_trips_through_normalizer() {
    let mut editor = ScheduleEditor::open(None, &[], actor());
    let id = editor.add_entry(Weekday::Wednesday);
    editor
        .update_field(Weekday::Wednesday, &id, EntryField::Hours(23))
        .unwrap();
    editor
        .update_field(Weekday::Wednesday, &id, EntryField::Minutes(59))
        .unwrap();
    editor
        .update_field(Weekday::Wednesday, &id, EntryField::Category("Travel".into()))
        .unwrap();
    editor.confirm(Weekday::Wednesday, &id).unwrap();

    let saved = editor.save();
    assert_eq!(normalize(ColumnType::WeeklySchedule, &saved.to_json()), saved);
}

// =========================================================================
// Grid Integration Tests
// =========================================================================

#[tokio::test]
async fn test_schedule_cell_saved_through_view() {
    let mut set = TableSet::new();
    let table = set.create_table("Hours");
    let column = set.add_column(&table.id, "Week").unwrap();
    set.update_column(
        &column.id,
        ColumnType::WeeklySchedule,
        Some(json!(["Meeting", "Travel", "Meeting"])),
    )
    .unwrap();
    let backend = MemoryBackend::new(set);

    let mut view = TableView::load(&backend, &table.id, AccessLevel::Editor, GridConfig::default())
        .await
        .unwrap();
    view.set_mode(TableMode::Edit).unwrap();

    let cell = view.grid().cell(0, 0).unwrap().clone();
    let categories = cell_choices(&cell);
    let current = match &cell.value {
        CellValue::WeeklySchedule(schedule) => schedule.clone(),
        other => panic!("unexpected {other:?}"),
    };

    let mut editor = ScheduleEditor::open(current.as_ref(), &categories, actor());
    assert_eq!(editor.categories(), ["Meeting", "Travel"]);
    let id = editor.add_entry(Weekday::Monday);
    editor
        .update_field(Weekday::Monday, &id, EntryField::Category("Meeting".into()))
        .unwrap();
    editor
        .update_field(Weekday::Monday, &id, EntryField::Hours(2))
        .unwrap();
    editor.confirm(Weekday::Monday, &id).unwrap();

    view.update_cell(&backend, 0, 0, editor.save()).await.unwrap();
    view.refresh(&backend).await.unwrap();

    let stored = &view.grid().cell(0, 0).unwrap().value;
    let summary = ScheduleSummary::of_value(stored).unwrap();
    insta::assert_snapshot!(summary.cell_label(), @"Woche: 2:00");
    let records = backend.list_cell_records(&table.id).await.unwrap();
    assert_eq!(records[0].value["monday"][0]["category"], json!("Meeting"));
}
