//! In-memory backend.

use std::cell::RefCell;

use serde_json::Value;
use tabula_model::{BackendError, CellRecord, Column, ColumnType, Profile, TableBackend};

use crate::tables::TableSet;

/// Backend over a [`TableSet`] held in memory.
///
/// Writes can be made to fail on demand with [`MemoryBackend::fail_next`],
/// which is how callers exercise their rollback paths.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: RefCell<TableSet>,
    fail_next: RefCell<Option<BackendError>>,
}

impl MemoryBackend {
    pub fn new(tables: TableSet) -> Self {
        Self {
            tables: RefCell::new(tables),
            fail_next: RefCell::new(None),
        }
    }

    /// Make the next write fail with `error`. Reads are unaffected.
    pub fn fail_next(&self, error: BackendError) {
        *self.fail_next.borrow_mut() = Some(error);
    }

    /// Copy of the current data.
    pub fn snapshot(&self) -> TableSet {
        self.tables.borrow().clone()
    }

    /// Run `f` against the data directly, bypassing fault injection.
    pub fn with_tables<T>(&self, f: impl FnOnce(&mut TableSet) -> T) -> T {
        f(&mut self.tables.borrow_mut())
    }

    fn write<T>(
        &self,
        f: impl FnOnce(&mut TableSet) -> Result<T, BackendError>,
    ) -> Result<T, BackendError> {
        if let Some(error) = self.fail_next.borrow_mut().take() {
            tracing::debug!(error = %error, "Injected write failure");
            return Err(error);
        }
        f(&mut self.tables.borrow_mut())
    }
}

impl TableBackend for MemoryBackend {
    async fn list_columns(&self, table_id: &str) -> Result<Vec<Column>, BackendError> {
        self.tables.borrow().list_columns(table_id)
    }

    async fn list_cell_records(&self, table_id: &str) -> Result<Vec<CellRecord>, BackendError> {
        self.tables.borrow().list_records(table_id)
    }

    async fn upsert_cell(
        &self,
        table_id: &str,
        row_index: u32,
        column_id: &str,
        value: Value,
    ) -> Result<(), BackendError> {
        self.write(|tables| tables.upsert(table_id, row_index, column_id, value))
    }

    async fn delete_row(&self, table_id: &str, row_index: u32) -> Result<(), BackendError> {
        self.write(|tables| tables.delete_row(table_id, row_index))
    }

    async fn add_column(&self, table_id: &str, name: &str) -> Result<Column, BackendError> {
        self.write(|tables| tables.add_column(table_id, name))
    }

    async fn update_column(
        &self,
        column_id: &str,
        column_type: ColumnType,
        options: Option<Value>,
    ) -> Result<Column, BackendError> {
        self.write(|tables| tables.update_column(column_id, column_type, options))
    }

    async fn delete_column(&self, column_id: &str) -> Result<(), BackendError> {
        self.write(|tables| tables.delete_column(column_id))
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, BackendError> {
        Ok(self.tables.borrow().list_profiles())
    }
}
