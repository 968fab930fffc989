//! Interface to the hosted table service.
//!
//! Persistence, authorization and row numbering all live behind this trait.
//! The core only ever reads snapshots and issues single-purpose writes:
//!
//! - reads: [`list_columns`](TableBackend::list_columns),
//!   [`list_cell_records`](TableBackend::list_cell_records),
//!   [`list_profiles`](TableBackend::list_profiles)
//! - writes: [`upsert_cell`](TableBackend::upsert_cell),
//!   [`delete_row`](TableBackend::delete_row),
//!   [`add_column`](TableBackend::add_column),
//!   [`update_column`](TableBackend::update_column),
//!   [`delete_column`](TableBackend::delete_column)
//!
//! The UI runs on a single cooperative event loop, so implementations are
//! not required to be `Send`.

use serde_json::Value;

use crate::cell::CellRecord;
use crate::column::{Column, ColumnType};
use crate::error::BackendError;
use crate::identity::Profile;

/// Narrow async interface to the table service.
#[allow(async_fn_in_trait)]
pub trait TableBackend {
    /// Columns of a table, ordered by `order`.
    async fn list_columns(&self, table_id: &str) -> Result<Vec<Column>, BackendError>;

    /// All persisted cells of a table.
    async fn list_cell_records(&self, table_id: &str) -> Result<Vec<CellRecord>, BackendError>;

    /// Insert or replace the record at `(table_id, row_index, column_id)`.
    async fn upsert_cell(
        &self,
        table_id: &str,
        row_index: u32,
        column_id: &str,
        value: Value,
    ) -> Result<(), BackendError>;

    /// Delete every record of a row and shift all later rows of the same
    /// table up by one, keeping row indices contiguous from 0.
    async fn delete_row(&self, table_id: &str, row_index: u32) -> Result<(), BackendError>;

    /// Append a text column named `name` at `max(order) + 1`.
    async fn add_column(&self, table_id: &str, name: &str) -> Result<Column, BackendError>;

    /// Change a column's type and options. Existing cell values are not rewritten.
    async fn update_column(
        &self,
        column_id: &str,
        column_type: ColumnType,
        options: Option<Value>,
    ) -> Result<Column, BackendError>;

    /// Delete a column together with all of its records.
    async fn delete_column(&self, column_id: &str) -> Result<(), BackendError>;

    /// User directory for `user_dropdown` columns.
    async fn list_profiles(&self) -> Result<Vec<Profile>, BackendError>;
}
