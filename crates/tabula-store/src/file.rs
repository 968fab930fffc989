//! JSON file backend.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tabula_model::{BackendError, CellRecord, Column, ColumnType, Profile, TableBackend};

use crate::error::Result;
use crate::io::{load_or_default, save_tables_async};
use crate::tables::TableSet;

/// Backend persisting every write to a JSON file.
///
/// A write is applied to a copy of the data, saved, and only then becomes
/// visible; a failed save leaves both the file and the in-memory data as
/// they were. Overlapping writes are not queued, so the later save wins.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    tables: RefCell<TableSet>,
}

impl FileBackend {
    /// Open a table file, starting empty if it does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tables = load_or_default(&path)?;
        Ok(Self {
            path,
            tables: RefCell::new(tables),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current data.
    pub fn snapshot(&self) -> TableSet {
        self.tables.borrow().clone()
    }

    /// Apply `f` to a copy, save it, then publish it.
    pub async fn write<T>(
        &self,
        f: impl FnOnce(&mut TableSet) -> std::result::Result<T, BackendError>,
    ) -> std::result::Result<T, BackendError> {
        let mut next = self.tables.borrow().clone();
        let output = f(&mut next)?;
        let saved = save_tables_async(next, self.path.clone()).await?;
        *self.tables.borrow_mut() = saved;
        Ok(output)
    }
}

impl TableBackend for FileBackend {
    async fn list_columns(&self, table_id: &str) -> std::result::Result<Vec<Column>, BackendError> {
        self.tables.borrow().list_columns(table_id)
    }

    async fn list_cell_records(
        &self,
        table_id: &str,
    ) -> std::result::Result<Vec<CellRecord>, BackendError> {
        self.tables.borrow().list_records(table_id)
    }

    async fn upsert_cell(
        &self,
        table_id: &str,
        row_index: u32,
        column_id: &str,
        value: Value,
    ) -> std::result::Result<(), BackendError> {
        self.write(|tables| tables.upsert(table_id, row_index, column_id, value))
            .await
    }

    async fn delete_row(&self, table_id: &str, row_index: u32) -> std::result::Result<(), BackendError> {
        self.write(|tables| tables.delete_row(table_id, row_index))
            .await
    }

    async fn add_column(&self, table_id: &str, name: &str) -> std::result::Result<Column, BackendError> {
        self.write(|tables| tables.add_column(table_id, name)).await
    }

    async fn update_column(
        &self,
        column_id: &str,
        column_type: ColumnType,
        options: Option<Value>,
    ) -> std::result::Result<Column, BackendError> {
        self.write(|tables| tables.update_column(column_id, column_type, options))
            .await
    }

    async fn delete_column(&self, column_id: &str) -> std::result::Result<(), BackendError> {
        self.write(|tables| tables.delete_column(column_id)).await
    }

    async fn list_profiles(&self) -> std::result::Result<Vec<Profile>, BackendError> {
        Ok(self.tables.borrow().list_profiles())
    }
}
