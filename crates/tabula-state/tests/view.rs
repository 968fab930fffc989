//! Tests for the table view against the in-memory backend.
//!
//! Covers optimistic edits, rollback from the confirmed records, same-cell
//! races, mode gating and structural operations.

use serde_json::json;
use tabula_model::{
    AccessLevel, BackendError, CellValue, ColumnType, TableBackend, TableMode,
};
use tabula_state::{EditOutcome, GridConfig, Severity, StateError, TableView};
use tabula_store::{MemoryBackend, TableSet};

struct Fixture {
    backend: MemoryBackend,
    table_id: String,
}

/// A table with a text column and a checkbox column; row 0 has "alpha".
fn fixture() -> Fixture {
    let mut set = TableSet::new();
    let table = set.create_table("Plan");
    let name = set.add_column(&table.id, "Name").unwrap();
    let done = set.add_column(&table.id, "Done").unwrap();
    set.update_column(&done.id, ColumnType::Checkbox, None)
        .unwrap();
    set.upsert(&table.id, 0, &name.id, json!("alpha")).unwrap();
    Fixture {
        backend: MemoryBackend::new(set),
        table_id: table.id,
    }
}

async fn editing_view(fx: &Fixture) -> TableView {
    let mut view = TableView::load(
        &fx.backend,
        &fx.table_id,
        AccessLevel::Owner,
        GridConfig::default(),
    )
    .await
    .unwrap();
    view.set_mode(TableMode::Structure).unwrap();
    view
}

fn offline() -> BackendError {
    BackendError::Network {
        operation: "upsert_cell",
        message: "offline".into(),
    }
}

fn text(s: &str) -> CellValue {
    CellValue::Text(s.into())
}

// =========================================================================
// Optimistic Edit Tests
// =========================================================================

#[tokio::test]
async fn test_successful_edit_persists_and_keeps_value() {
    let fx = fixture();
    let mut view = editing_view(&fx).await;

    let outcome = view.update_cell(&fx.backend, 0, 0, text("beta")).await.unwrap();

    assert_eq!(outcome, EditOutcome::Saved);
    assert_eq!(view.grid().cell(0, 0).unwrap().value, text("beta"));
    let records = fx.backend.list_cell_records(&fx.table_id).await.unwrap();
    assert_eq!(records[0].value, json!("beta"));
    assert_eq!(view.confirmed_value(0, 0), Some(text("beta")));

    let notices = view.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].severity, Severity::Success);
}

#[tokio::test]
async fn test_failed_edit_rolls_back_to_confirmed_value() {
    let fx = fixture();
    let mut view = editing_view(&fx).await;
    let before = view.grid().clone();

    fx.backend.fail_next(offline());
    let outcome = view.update_cell(&fx.backend, 0, 0, text("beta")).await.unwrap();

    assert_eq!(outcome, EditOutcome::RolledBack);
    assert_eq!(view.grid(), &before);
    assert_eq!(view.grid().cell(0, 0).unwrap().value, text("alpha"));
    assert!(view.drain_notices()[0].is_error());
}

#[tokio::test]
async fn test_rollback_uses_last_confirmed_not_type_default() {
    let fx = fixture();
    let mut view = editing_view(&fx).await;

    view.update_cell(&fx.backend, 0, 0, text("beta")).await.unwrap();
    fx.backend.fail_next(offline());
    view.update_cell(&fx.backend, 0, 0, text("gamma")).await.unwrap();

    assert_eq!(view.grid().cell(0, 0).unwrap().value, text("beta"));
}

#[tokio::test]
async fn test_edit_leaves_other_cells_untouched() {
    let fx = fixture();
    let mut view = editing_view(&fx).await;
    let before = view.snapshot();

    view.update_cell(&fx.backend, 3, 1, CellValue::Checkbox(true))
        .await
        .unwrap();

    let after = view.grid();
    for (r, row) in before.data.rows().iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if (r, c) != (3, 1) {
                assert_eq!(after.cell(r, c), Some(cell));
            }
        }
    }
    assert!(before.is_stale(view.version()));
    // The snapshot handed out earlier was not mutated in place.
    assert_eq!(before.data.cell(3, 1).unwrap().value, CellValue::Checkbox(false));
}

#[tokio::test]
async fn test_stale_column_index_is_skipped() {
    let fx = fixture();
    let mut view = editing_view(&fx).await;
    let version = view.version();

    let outcome = view.update_cell(&fx.backend, 0, 9, text("x")).await.unwrap();

    assert_eq!(outcome, EditOutcome::Skipped);
    assert_eq!(view.version(), version);
    assert!(view.drain_notices().is_empty());
}

#[tokio::test]
async fn test_type_mismatch_is_refused() {
    let fx = fixture();
    let mut view = editing_view(&fx).await;
    let err = view
        .update_cell(&fx.backend, 0, 1, text("yes"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StateError::TypeMismatch {
            expected: ColumnType::Checkbox,
            found: ColumnType::Text
        }
    ));
}

// =========================================================================
// Same-Cell Race Tests
// =========================================================================

#[tokio::test]
async fn test_older_failure_does_not_clobber_newer_edit() {
    let fx = fixture();
    let mut view = editing_view(&fx).await;

    let first = view.begin_edit(0, 0, text("one")).unwrap().unwrap();
    let second = view.begin_edit(0, 0, text("two")).unwrap().unwrap();

    assert_eq!(view.finish_edit(first, Err(offline())), EditOutcome::Superseded);
    assert_eq!(view.grid().cell(0, 0).unwrap().value, text("two"));

    assert_eq!(view.finish_edit(second, Ok(())), EditOutcome::Saved);
    assert_eq!(view.confirmed_value(0, 0), Some(text("two")));
}

#[tokio::test]
async fn test_late_older_success_does_not_replace_newer_confirmation() {
    let fx = fixture();
    let mut view = editing_view(&fx).await;

    let first = view.begin_edit(0, 0, text("one")).unwrap().unwrap();
    let second = view.begin_edit(0, 0, text("two")).unwrap().unwrap();

    assert_eq!(view.finish_edit(second, Ok(())), EditOutcome::Saved);
    assert_eq!(view.finish_edit(first, Ok(())), EditOutcome::Superseded);
    assert_eq!(view.confirmed_value(0, 0), Some(text("two")));
    assert_eq!(view.grid().cell(0, 0).unwrap().value, text("two"));
}

#[tokio::test]
async fn test_edit_resolving_after_reload_is_ignored() {
    let fx = fixture();
    let mut view = editing_view(&fx).await;

    let pending = view.begin_edit(0, 0, text("draft")).unwrap().unwrap();
    view.refresh(&fx.backend).await.unwrap();

    assert_eq!(view.finish_edit(pending, Err(offline())), EditOutcome::Superseded);
    assert_eq!(view.grid().cell(0, 0).unwrap().value, text("alpha"));
}

// =========================================================================
// Mode Tests
// =========================================================================

#[tokio::test]
async fn test_view_mode_refuses_edits_without_calling_backend() {
    let fx = fixture();
    let mut view = TableView::load(
        &fx.backend,
        &fx.table_id,
        AccessLevel::Owner,
        GridConfig::default(),
    )
    .await
    .unwrap();

    let err = view
        .update_cell(&fx.backend, 0, 0, text("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, StateError::ModeDenied { mode: TableMode::View, .. }));
    let records = fx.backend.list_cell_records(&fx.table_id).await.unwrap();
    assert_eq!(records[0].value, json!("alpha"));
}

#[tokio::test]
async fn test_access_level_limits_modes() {
    let fx = fixture();
    let mut view = TableView::load(
        &fx.backend,
        &fx.table_id,
        AccessLevel::Editor,
        GridConfig::default(),
    )
    .await
    .unwrap();

    view.set_mode(TableMode::Edit).unwrap();
    assert!(matches!(
        view.set_mode(TableMode::Structure),
        Err(StateError::AccessDenied { .. })
    ));
    assert!(matches!(view.add_row(), Err(StateError::ModeDenied { .. })));
}

// =========================================================================
// Structural Operation Tests
// =========================================================================

#[tokio::test]
async fn test_add_row_is_local_until_written() {
    let fx = fixture();
    let mut view = editing_view(&fx).await;

    let row = view.add_row().unwrap();
    assert_eq!(row, 5);
    assert_eq!(view.grid().row_count(), 6);
    assert_eq!(view.grid().cell(5, 1).unwrap().value, CellValue::Checkbox(false));

    view.update_cell(&fx.backend, row, 0, text("new")).await.unwrap();
    view.refresh(&fx.backend).await.unwrap();
    assert_eq!(view.grid().row_count(), 6);
}

#[tokio::test]
async fn test_delete_row_reloads_renumbered_grid() {
    let fx = fixture();
    let mut view = editing_view(&fx).await;
    for (row, value) in [(1, "b"), (2, "c"), (6, "g")] {
        view.update_cell(&fx.backend, row, 0, text(value)).await.unwrap();
    }
    view.refresh(&fx.backend).await.unwrap();
    assert_eq!(view.grid().row_count(), 7);

    view.delete_row(&fx.backend, 1).await.unwrap();

    assert_eq!(view.grid().row_count(), 6);
    assert_eq!(view.grid().cell(1, 0).unwrap().value, text("c"));
    assert_eq!(view.grid().cell(5, 0).unwrap().value, text("g"));
}

#[tokio::test]
async fn test_failed_structural_change_is_not_rolled_back_locally() {
    let fx = fixture();
    let mut view = editing_view(&fx).await;
    let version = view.version();

    fx.backend.fail_next(offline());
    let err = view.delete_row(&fx.backend, 0).await.unwrap_err();

    assert!(matches!(err, StateError::Backend { operation: "delete_row", .. }));
    assert_eq!(view.version(), version);
    let notices = view.drain_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].is_error());
}

#[tokio::test]
async fn test_add_update_delete_column() {
    let fx = fixture();
    let mut view = editing_view(&fx).await;

    view.add_column(&fx.backend, "Week").await.unwrap();
    assert_eq!(view.columns().len(), 3);
    let week = view.columns()[2].clone();
    assert_eq!(week.order, 2);
    assert_eq!(week.column_type, ColumnType::Text);

    view.update_column(
        &fx.backend,
        &week.id,
        ColumnType::CalendarWeeks,
        Some(&json!({"year": "2025"})),
    )
    .await
    .unwrap();
    assert_eq!(view.columns()[2].options, Some(json!({"year": 2025})));
    assert_eq!(view.grid().cell(0, 2).unwrap().year, Some(2025));

    view.delete_column(&fx.backend, &week.id).await.unwrap();
    assert_eq!(view.grid().column_count(), 2);
}

#[tokio::test]
async fn test_update_unknown_column() {
    let fx = fixture();
    let mut view = editing_view(&fx).await;
    let err = view
        .update_column(&fx.backend, "ghost", ColumnType::Select, None)
        .await
        .unwrap_err();
    assert!(matches!(err, StateError::UnknownColumn { .. }));
}

#[tokio::test]
async fn test_type_change_reinterprets_stored_cells() {
    let fx = fixture();
    let mut view = editing_view(&fx).await;
    let name = view.columns()[0].id.clone();

    view.update_column(&fx.backend, &name, ColumnType::Checkbox, None)
        .await
        .unwrap();
    assert_eq!(view.grid().cell(0, 0).unwrap().value, CellValue::Checkbox(false));

    view.update_column(&fx.backend, &name, ColumnType::Text, None)
        .await
        .unwrap();
    assert_eq!(view.grid().cell(0, 0).unwrap().value, text("alpha"));
}
