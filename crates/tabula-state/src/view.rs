//! Table view state: the materialized grid plus optimistic cell edits.
//!
//! A [`TableView`] owns one table's grid for as long as the table is shown.
//! The grid sits behind an [`Arc`] and is copied on write, so a renderer
//! holding a snapshot never sees a half-applied change.
//!
//! Cell edits are optimistic and split in two halves so the grid stays
//! usable while a save is in flight:
//!
//! 1. [`TableView::begin_edit`] applies the value to the grid and returns a
//!    [`PendingEdit`] ticket.
//! 2. The caller sends the ticket's payload to the backend.
//! 3. [`TableView::finish_edit`] keeps the value on success, or restores the
//!    cell from the last confirmed records on failure.
//!
//! [`TableView::update_cell`] runs all three steps for callers that do not
//! need to interleave edits.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde_json::Value;
use tabula_model::{
    AccessLevel, BackendError, CellRecord, CellValue, Column, ColumnType, TableBackend, TableMode,
};
use tabula_normalize::{normalize_record_value, process_column_options};

use crate::config::GridConfig;
use crate::error::{Result, StateError};
use crate::grid::{Grid, materialize};
use crate::notice::Notice;
use crate::versioned::Versioned;

/// Sequence bookkeeping for one grid coordinate.
#[derive(Debug, Clone, Copy, Default)]
struct CellTicket {
    /// Latest edit applied to the grid.
    issued: u64,
    /// Latest edit the backend accepted.
    confirmed: u64,
}

/// An optimistic edit waiting for the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    table_id: String,
    row: u32,
    column: usize,
    column_id: String,
    value: CellValue,
    seq: u64,
}

impl PendingEdit {
    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn column_id(&self) -> &str {
        &self.column_id
    }

    pub fn value(&self) -> &CellValue {
        &self.value
    }

    /// JSON value to upsert.
    pub fn payload(&self) -> Value {
        self.value.to_json()
    }
}

/// How an edit was reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Persisted; the new value stays.
    Saved,
    /// Persisting failed; the cell shows its last confirmed value again.
    RolledBack,
    /// A newer edit of the same cell exists; the grid was left alone.
    Superseded,
    /// The coordinate no longer exists; nothing was sent.
    Skipped,
}

/// State of one table as shown to the user.
#[derive(Debug)]
pub struct TableView {
    table_id: String,
    columns: Vec<Column>,
    /// Records as last confirmed by the backend.
    confirmed: Vec<CellRecord>,
    grid: Arc<Grid>,
    version: u64,
    config: GridConfig,
    mode: TableMode,
    access: AccessLevel,
    tickets: HashMap<(u32, String), CellTicket>,
    next_seq: u64,
    notices: VecDeque<Notice>,
}

impl TableView {
    /// Build a view from already loaded data. Starts in view mode.
    pub fn new(
        table_id: impl Into<String>,
        columns: Vec<Column>,
        records: Vec<CellRecord>,
        access: AccessLevel,
        config: GridConfig,
    ) -> Self {
        let grid = Arc::new(materialize(&columns, &records, &config));
        Self {
            table_id: table_id.into(),
            columns,
            confirmed: records,
            grid,
            version: 0,
            config,
            mode: TableMode::View,
            access,
            tickets: HashMap::new(),
            next_seq: 0,
            notices: VecDeque::new(),
        }
    }

    /// Fetch a table's columns and records and build its view.
    pub async fn load<B: TableBackend>(
        backend: &B,
        table_id: &str,
        access: AccessLevel,
        config: GridConfig,
    ) -> Result<Self> {
        let (columns, records) = fetch(backend, table_id).await?;
        tracing::info!(
            table_id,
            columns = columns.len(),
            records = records.len(),
            "Loaded table"
        );
        Ok(Self::new(table_id, columns, records, access, config))
    }

    /// Reload columns and records from the backend and rebuild the grid.
    pub async fn refresh<B: TableBackend>(&mut self, backend: &B) -> Result<()> {
        let (columns, records) = fetch(backend, &self.table_id).await?;
        self.replace_snapshot(columns, records);
        Ok(())
    }

    /// Replace the confirmed columns and records and rebuild the grid wholesale.
    ///
    /// Edits still in flight are detached: when they resolve they no longer
    /// touch the grid.
    pub fn replace_snapshot(&mut self, columns: Vec<Column>, records: Vec<CellRecord>) {
        self.grid = Arc::new(materialize(&columns, &records, &self.config));
        self.columns = columns;
        self.confirmed = records;
        self.tickets.clear();
        self.bump();
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn table_id(&self) -> &str {
        &self.table_id
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Records as last confirmed by the backend.
    pub fn confirmed_records(&self) -> &[CellRecord] {
        &self.confirmed
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Shared snapshot of the grid tagged with the current version.
    pub fn snapshot(&self) -> Versioned<Arc<Grid>> {
        Versioned {
            data: Arc::clone(&self.grid),
            source_version: self.version,
        }
    }

    /// Incremented on every grid change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn mode(&self) -> TableMode {
        self.mode
    }

    pub fn access(&self) -> AccessLevel {
        self.access
    }

    /// Index of the column with this id.
    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.id == column_id)
    }

    /// Switch the interaction mode, if the access level allows it.
    pub fn set_mode(&mut self, mode: TableMode) -> Result<()> {
        if !self.access.allows(mode) {
            return Err(StateError::AccessDenied {
                access: self.access,
                mode,
            });
        }
        self.mode = mode;
        Ok(())
    }

    /// Take all queued notifications, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    // ---------------------------------------------------------------------
    // Cell edits
    // ---------------------------------------------------------------------

    /// Apply `value` to the grid and hand out a ticket for persisting it.
    ///
    /// Returns `Ok(None)` for a coordinate that no longer exists, which
    /// happens when an edit races a column or row deletion.
    pub fn begin_edit(
        &mut self,
        row: u32,
        column: usize,
        value: CellValue,
    ) -> Result<Option<PendingEdit>> {
        self.require(self.mode.allows_cell_edits(), "update_cell")?;

        let Some(target) = self.columns.get(column) else {
            tracing::debug!(table_id = %self.table_id, row, column, "Edit of stale column index ignored");
            return Ok(None);
        };
        if value.column_type() != target.column_type {
            return Err(StateError::TypeMismatch {
                expected: target.column_type,
                found: value.column_type(),
            });
        }
        let column_id = target.id.clone();

        if !Arc::make_mut(&mut self.grid).set_value(row as usize, column, value.clone()) {
            tracing::debug!(table_id = %self.table_id, row, column, "Edit of stale row index ignored");
            return Ok(None);
        }
        self.bump();

        self.next_seq += 1;
        let seq = self.next_seq;
        self.tickets
            .entry((row, column_id.clone()))
            .or_default()
            .issued = seq;

        Ok(Some(PendingEdit {
            table_id: self.table_id.clone(),
            row,
            column,
            column_id,
            value,
            seq,
        }))
    }

    /// Reconcile an edit with the backend's answer.
    pub fn finish_edit(
        &mut self,
        edit: PendingEdit,
        result: std::result::Result<(), BackendError>,
    ) -> EditOutcome {
        let key = (edit.row, edit.column_id.clone());
        let Some(ticket) = self.tickets.get_mut(&key) else {
            tracing::debug!(row = edit.row, column = %edit.column_id, "Edit resolved after reload");
            return EditOutcome::Superseded;
        };
        let latest = ticket.issued == edit.seq;

        match result {
            Ok(()) => {
                if edit.seq > ticket.confirmed {
                    ticket.confirmed = edit.seq;
                    self.confirm_record(edit.row, &edit.column_id, edit.payload());
                }
                if !latest {
                    return EditOutcome::Superseded;
                }
                tracing::debug!(row = edit.row, column = %edit.column_id, "Cell saved");
                self.notices
                    .push_back(Notice::success("Saved", "The cell was saved."));
                EditOutcome::Saved
            }
            Err(error) => {
                tracing::warn!(
                    table_id = %self.table_id,
                    row = edit.row,
                    column = %edit.column_id,
                    error = %error,
                    "Cell update failed"
                );
                self.notices
                    .push_back(Notice::error("Save failed", error.user_message()));
                if !latest {
                    return EditOutcome::Superseded;
                }
                self.rollback(&edit);
                EditOutcome::RolledBack
            }
        }
    }

    /// Edit one cell end to end: apply, persist, reconcile.
    pub async fn update_cell<B: TableBackend>(
        &mut self,
        backend: &B,
        row: u32,
        column: usize,
        value: CellValue,
    ) -> Result<EditOutcome> {
        let Some(edit) = self.begin_edit(row, column, value)? else {
            return Ok(EditOutcome::Skipped);
        };
        let result = backend
            .upsert_cell(edit.table_id(), edit.row(), edit.column_id(), edit.payload())
            .await;
        Ok(self.finish_edit(edit, result))
    }

    /// Value the cell had in the last confirmed records.
    pub fn confirmed_value(&self, row: u32, column: usize) -> Option<CellValue> {
        let column = self.columns.get(column)?;
        let raw = self
            .confirmed
            .iter()
            .find(|record| record.is_at(row, &column.id))
            .map(|record| &record.value);
        Some(normalize_record_value(column.column_type, raw))
    }

    fn rollback(&mut self, edit: &PendingEdit) {
        let Some(previous) = self.confirmed_value(edit.row, edit.column) else {
            return;
        };
        tracing::warn!(row = edit.row, column = %edit.column_id, "Rolling back cell");
        if Arc::make_mut(&mut self.grid).set_value(edit.row as usize, edit.column, previous) {
            self.bump();
        }
    }

    fn confirm_record(&mut self, row: u32, column_id: &str, value: Value) {
        match self
            .confirmed
            .iter_mut()
            .find(|record| record.is_at(row, column_id))
        {
            Some(record) => record.value = value,
            None => self
                .confirmed
                .push(CellRecord::new(self.table_id.clone(), row, column_id, value)),
        }
    }

    // ---------------------------------------------------------------------
    // Structure
    // ---------------------------------------------------------------------

    /// Append an empty row locally. Nothing is persisted until a cell of the
    /// row is written. Returns the new row's index.
    pub fn add_row(&mut self) -> Result<u32> {
        self.require(self.mode.allows_structure_changes(), "add_row")?;
        let grid = Arc::make_mut(&mut self.grid);
        grid.push_empty_row(&self.columns);
        let row = grid.row_count().saturating_sub(1);
        self.bump();
        tracing::debug!(table_id = %self.table_id, row, "Added local row");
        Ok(u32::try_from(row).unwrap_or(u32::MAX))
    }

    /// Delete a row. The backend shifts later rows up; the grid is reloaded.
    pub async fn delete_row<B: TableBackend>(&mut self, backend: &B, row: u32) -> Result<()> {
        self.require(self.mode.allows_structure_changes(), "delete_row")?;
        let result = backend.delete_row(&self.table_id, row).await;
        self.structural_outcome(
            backend,
            "delete_row",
            result,
            ("Row deleted", "The row was removed."),
            "Could not delete row",
        )
        .await
    }

    /// Append a text column named `name`.
    pub async fn add_column<B: TableBackend>(&mut self, backend: &B, name: &str) -> Result<()> {
        self.require(self.mode.allows_structure_changes(), "add_column")?;
        let result = backend
            .add_column(&self.table_id, name)
            .await
            .map(|_| ());
        self.structural_outcome(
            backend,
            "add_column",
            result,
            ("Column added", "The column was added."),
            "Could not add column",
        )
        .await
    }

    /// Change a column's type and options.
    ///
    /// Options are processed for the new type before they are sent. Stored
    /// cell values are not rewritten; they are reinterpreted on the next
    /// materialization.
    pub async fn update_column<B: TableBackend>(
        &mut self,
        backend: &B,
        column_id: &str,
        column_type: ColumnType,
        options: Option<&Value>,
    ) -> Result<()> {
        self.require(self.mode.allows_structure_changes(), "update_column")?;
        if self.column_index(column_id).is_none() {
            return Err(StateError::UnknownColumn {
                column_id: column_id.to_string(),
            });
        }
        let options = process_column_options(column_type, options);
        let result = backend
            .update_column(column_id, column_type, options)
            .await
            .map(|_| ());
        self.structural_outcome(
            backend,
            "update_column",
            result,
            ("Column updated", "The column settings were saved."),
            "Could not update column",
        )
        .await
    }

    /// Delete a column and, on the backend, all of its cells.
    pub async fn delete_column<B: TableBackend>(
        &mut self,
        backend: &B,
        column_id: &str,
    ) -> Result<()> {
        self.require(self.mode.allows_structure_changes(), "delete_column")?;
        let result = backend.delete_column(column_id).await;
        self.structural_outcome(
            backend,
            "delete_column",
            result,
            ("Column deleted", "The column and its cells were removed."),
            "Could not delete column",
        )
        .await
    }

    /// Shared tail of structural operations: notify, then reload on success.
    /// Failures are not rolled back locally; the grid still shows the last
    /// confirmed state and the user may retry.
    async fn structural_outcome<B: TableBackend>(
        &mut self,
        backend: &B,
        operation: &'static str,
        result: std::result::Result<(), BackendError>,
        success: (&str, &str),
        failure_title: &str,
    ) -> Result<()> {
        match result {
            Ok(()) => {
                tracing::info!(table_id = %self.table_id, operation, "Structural change applied");
                self.notices
                    .push_back(Notice::success(success.0, success.1));
                self.refresh(backend).await
            }
            Err(source) => {
                tracing::warn!(table_id = %self.table_id, operation, error = %source, "Structural change failed");
                self.notices
                    .push_back(Notice::error(failure_title, source.user_message()));
                Err(StateError::backend(operation, source))
            }
        }
    }

    fn require(&self, allowed: bool, operation: &'static str) -> Result<()> {
        if allowed {
            Ok(())
        } else {
            Err(StateError::ModeDenied {
                operation,
                mode: self.mode,
            })
        }
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}

async fn fetch<B: TableBackend>(
    backend: &B,
    table_id: &str,
) -> Result<(Vec<Column>, Vec<CellRecord>)> {
    let mut columns = backend
        .list_columns(table_id)
        .await
        .map_err(|e| StateError::backend("list_columns", e))?;
    columns.sort_by_key(|column| column.order);
    let records = backend
        .list_cell_records(table_id)
        .await
        .map_err(|e| StateError::backend("list_cell_records", e))?;
    Ok((columns, records))
}
