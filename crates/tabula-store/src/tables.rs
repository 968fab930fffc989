//! The table data set and the mutation rules the backend guarantees.
//!
//! [`TableSet`] is plain data: every backend implementation in this crate
//! keeps one and applies writes through the methods here, so the in-memory
//! and file backends share one set of semantics:
//!
//! - `(table_id, row_index, column_id)` is unique; writes upsert
//! - deleting a row shifts every later row of the same table up by one
//! - deleting a column deletes its records
//! - new columns get `order = max(order) + 1`
//! - deleting a table deletes its records, then its columns, then the table

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabula_model::{BackendError, CellRecord, Column, ColumnType, Profile};
use uuid::Uuid;

/// Current file format version.
pub const CURRENT_VERSION: u32 = 1;

/// A named table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub id: String,
    pub name: String,
}

/// Size of a table as listed to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableStats {
    pub columns: usize,
    /// Distinct row indices that hold at least one record.
    pub rows: usize,
}

/// Every table, column, record and user profile of a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSet {
    pub version: u32,
    #[serde(default)]
    pub tables: Vec<TableInfo>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub records: Vec<CellRecord>,
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Default for TableSet {
    fn default() -> Self {
        Self::new()
    }
}

impl TableSet {
    pub fn new() -> Self {
        Self {
            version: CURRENT_VERSION,
            tables: Vec::new(),
            columns: Vec::new(),
            records: Vec::new(),
            profiles: Vec::new(),
        }
    }

    /// Create an empty table and return it.
    pub fn create_table(&mut self, name: &str) -> TableInfo {
        let table = TableInfo {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };
        tracing::info!(table_id = %table.id, name, "Created table");
        self.tables.push(table.clone());
        table
    }

    pub fn table(&self, table_id: &str) -> Option<&TableInfo> {
        self.tables.iter().find(|table| table.id == table_id)
    }

    /// Look a table up by id, or by name when no id matches.
    pub fn find_table(&self, id_or_name: &str) -> Option<&TableInfo> {
        self.table(id_or_name)
            .or_else(|| self.tables.iter().find(|table| table.name == id_or_name))
    }

    /// Delete a table with all of its records and columns.
    ///
    /// Returns the removed records so callers can release what they point to.
    pub fn delete_table(&mut self, table_id: &str) -> Result<Vec<CellRecord>, BackendError> {
        self.require_table(table_id)?;
        let (removed, kept): (Vec<CellRecord>, Vec<CellRecord>) =
            std::mem::take(&mut self.records)
                .into_iter()
                .partition(|record| record.table_id == table_id);
        self.records = kept;

        let columns_before = self.columns.len();
        self.columns.retain(|column| column.table_id != table_id);
        let columns = columns_before - self.columns.len();

        self.tables.retain(|table| table.id != table_id);
        tracing::info!(table_id, records = removed.len(), columns, "Deleted table");
        Ok(removed)
    }

    /// Column count and number of rows holding data.
    pub fn table_stats(&self, table_id: &str) -> Result<TableStats, BackendError> {
        self.require_table(table_id)?;
        let columns = self
            .columns
            .iter()
            .filter(|column| column.table_id == table_id)
            .count();
        let rows = self
            .records
            .iter()
            .filter(|record| record.table_id == table_id)
            .map(|record| record.row_index)
            .collect::<HashSet<_>>()
            .len();
        Ok(TableStats { columns, rows })
    }

    fn require_table(&self, table_id: &str) -> Result<(), BackendError> {
        match self.table(table_id) {
            Some(_) => Ok(()),
            None => Err(BackendError::NotFound {
                entity: "table",
                id: table_id.to_string(),
            }),
        }
    }

    fn column_mut(&mut self, column_id: &str) -> Result<&mut Column, BackendError> {
        self.columns
            .iter_mut()
            .find(|column| column.id == column_id)
            .ok_or_else(|| BackendError::NotFound {
                entity: "column",
                id: column_id.to_string(),
            })
    }

    /// Columns of a table in display order.
    pub fn list_columns(&self, table_id: &str) -> Result<Vec<Column>, BackendError> {
        self.require_table(table_id)?;
        let mut columns: Vec<Column> = self
            .columns
            .iter()
            .filter(|column| column.table_id == table_id)
            .cloned()
            .collect();
        columns.sort_by_key(|column| column.order);
        Ok(columns)
    }

    /// Records of a table ordered by row, then column id.
    pub fn list_records(&self, table_id: &str) -> Result<Vec<CellRecord>, BackendError> {
        self.require_table(table_id)?;
        let mut records: Vec<CellRecord> = self
            .records
            .iter()
            .filter(|record| record.table_id == table_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            a.row_index
                .cmp(&b.row_index)
                .then_with(|| a.column_id.cmp(&b.column_id))
        });
        Ok(records)
    }

    /// Insert or replace the record at `(table_id, row_index, column_id)`.
    pub fn upsert(
        &mut self,
        table_id: &str,
        row_index: u32,
        column_id: &str,
        value: Value,
    ) -> Result<(), BackendError> {
        self.require_table(table_id)?;
        let column_exists = self
            .columns
            .iter()
            .any(|column| column.id == column_id && column.table_id == table_id);
        if !column_exists {
            return Err(BackendError::NotFound {
                entity: "column",
                id: column_id.to_string(),
            });
        }

        let existing = self
            .records
            .iter_mut()
            .find(|record| record.table_id == table_id && record.is_at(row_index, column_id));
        match existing {
            Some(record) => record.value = value,
            None => self
                .records
                .push(CellRecord::new(table_id, row_index, column_id, value)),
        }
        tracing::debug!(table_id, row = row_index, column = column_id, "Upserted cell");
        Ok(())
    }

    /// Delete a row and renumber the rows after it.
    pub fn delete_row(&mut self, table_id: &str, row_index: u32) -> Result<(), BackendError> {
        self.require_table(table_id)?;
        let before = self.records.len();
        self.records
            .retain(|record| record.table_id != table_id || record.row_index != row_index);
        let removed = before - self.records.len();

        let mut shifted = 0usize;
        for record in &mut self.records {
            if record.table_id == table_id && record.row_index > row_index {
                record.row_index -= 1;
                shifted += 1;
            }
        }
        tracing::info!(table_id, row = row_index, removed, shifted, "Deleted row");
        Ok(())
    }

    /// Append a text column at the end of the table.
    pub fn add_column(&mut self, table_id: &str, name: &str) -> Result<Column, BackendError> {
        self.require_table(table_id)?;
        let order = self
            .columns
            .iter()
            .filter(|column| column.table_id == table_id)
            .map(|column| column.order)
            .max()
            .map_or(0, |max| max + 1);
        let column = Column::new(Uuid::new_v4().to_string(), table_id, name, order);
        tracing::info!(table_id, column = %column.id, order, "Added column");
        self.columns.push(column.clone());
        Ok(column)
    }

    /// Change a column's type and options. Records are left as they are.
    pub fn update_column(
        &mut self,
        column_id: &str,
        column_type: ColumnType,
        options: Option<Value>,
    ) -> Result<Column, BackendError> {
        let column = self.column_mut(column_id)?;
        column.column_type = column_type;
        column.options = options;
        tracing::info!(column = column_id, column_type = %column_type, "Updated column");
        Ok(column.clone())
    }

    /// Delete a column and every record in it.
    pub fn delete_column(&mut self, column_id: &str) -> Result<(), BackendError> {
        let position = self
            .columns
            .iter()
            .position(|column| column.id == column_id)
            .ok_or_else(|| BackendError::NotFound {
                entity: "column",
                id: column_id.to_string(),
            })?;
        self.columns.remove(position);
        self.records.retain(|record| record.column_id != column_id);
        tracing::info!(column = column_id, "Deleted column");
        Ok(())
    }

    /// User directory ordered by username.
    pub fn list_profiles(&self) -> Vec<Profile> {
        let mut profiles = self.profiles.clone();
        profiles.sort_by(|a, b| a.username.cmp(&b.username));
        profiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set_with_table() -> (TableSet, String, String) {
        let mut set = TableSet::new();
        let table = set.create_table("Plan");
        let column = set.add_column(&table.id, "Name").unwrap();
        (set, table.id, column.id)
    }

    fn rows(set: &TableSet, table_id: &str) -> Vec<u32> {
        set.list_records(table_id)
            .unwrap()
            .iter()
            .map(|record| record.row_index)
            .collect()
    }

    #[test]
    fn test_upsert_replaces_on_key() {
        let (mut set, table, column) = set_with_table();
        set.upsert(&table, 0, &column, json!("a")).unwrap();
        set.upsert(&table, 0, &column, json!("b")).unwrap();
        let records = set.list_records(&table).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, json!("b"));
    }

    #[test]
    fn test_upsert_unknown_column() {
        let (mut set, table, _) = set_with_table();
        let err = set.upsert(&table, 0, "nope", json!("a")).unwrap_err();
        assert!(matches!(err, BackendError::NotFound { entity: "column", .. }));
    }

    #[test]
    fn test_delete_row_renumbers_gap() {
        let (mut set, table, column) = set_with_table();
        for row in [0, 1, 2, 3, 5] {
            set.upsert(&table, row, &column, json!(format!("r{row}")))
                .unwrap();
        }

        set.delete_row(&table, 4).unwrap();

        assert_eq!(rows(&set, &table), vec![0, 1, 2, 3, 4]);
        let last = set.list_records(&table).unwrap().pop().unwrap();
        assert_eq!(last.value, json!("r5"));
    }

    #[test]
    fn test_delete_row_only_touches_its_table() {
        let (mut set, table, column) = set_with_table();
        let other = set.create_table("Other");
        let other_column = set.add_column(&other.id, "X").unwrap();
        set.upsert(&table, 3, &column, json!("t")).unwrap();
        set.upsert(&other.id, 3, &other_column.id, json!("o")).unwrap();

        set.delete_row(&table, 0).unwrap();

        assert_eq!(rows(&set, &table), vec![2]);
        assert_eq!(rows(&set, &other.id), vec![3]);
    }

    #[test]
    fn test_add_column_order() {
        let mut set = TableSet::new();
        let table = set.create_table("Plan");
        assert_eq!(set.add_column(&table.id, "A").unwrap().order, 0);
        assert_eq!(set.add_column(&table.id, "B").unwrap().order, 1);
        let c = set.add_column(&table.id, "C").unwrap();
        assert_eq!(c.order, 2);
        assert_eq!(c.column_type, ColumnType::Text);
        assert_eq!(c.options, None);
    }

    #[test]
    fn test_delete_column_cascades() {
        let (mut set, table, column) = set_with_table();
        let keep = set.add_column(&table, "Keep").unwrap();
        set.upsert(&table, 0, &column, json!("x")).unwrap();
        set.upsert(&table, 0, &keep.id, json!("y")).unwrap();

        set.delete_column(&column).unwrap();

        let records = set.list_records(&table).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].column_id, keep.id);
        assert_eq!(set.list_columns(&table).unwrap().len(), 1);
    }

    #[test]
    fn test_update_column_keeps_records() {
        let (mut set, table, column) = set_with_table();
        set.upsert(&table, 0, &column, json!("true")).unwrap();
        let updated = set
            .update_column(&column, ColumnType::Checkbox, None)
            .unwrap();
        assert_eq!(updated.column_type, ColumnType::Checkbox);
        assert_eq!(set.list_records(&table).unwrap()[0].value, json!("true"));
    }

    #[test]
    fn test_delete_table_cascades() {
        let (mut set, table, column) = set_with_table();
        let other = set.create_table("Other");
        let other_column = set.add_column(&other.id, "X").unwrap();
        set.upsert(&table, 0, &column, json!("a")).unwrap();
        set.upsert(&table, 2, &column, json!("b")).unwrap();
        set.upsert(&other.id, 0, &other_column.id, json!("o")).unwrap();

        let removed = set.delete_table(&table).unwrap();

        assert_eq!(removed.len(), 2);
        assert!(set.table(&table).is_none());
        assert!(set.columns.iter().all(|c| c.table_id == other.id));
        assert!(set.records.iter().all(|r| r.table_id == other.id));
        assert_eq!(rows(&set, &other.id), vec![0]);
        assert!(matches!(
            set.delete_table(&table),
            Err(BackendError::NotFound { entity: "table", .. })
        ));
    }

    #[test]
    fn test_table_stats_count_distinct_rows() {
        let (mut set, table, column) = set_with_table();
        let second = set.add_column(&table, "Second").unwrap();
        for row in [0, 3] {
            set.upsert(&table, row, &column, json!("x")).unwrap();
            set.upsert(&table, row, &second.id, json!("y")).unwrap();
        }
        assert_eq!(
            set.table_stats(&table).unwrap(),
            TableStats { columns: 2, rows: 2 }
        );
    }

    #[test]
    fn test_find_table_by_name() {
        let (set, table, _) = set_with_table();
        assert_eq!(set.find_table("Plan").unwrap().id, table);
        assert_eq!(set.find_table(&table).unwrap().name, "Plan");
        assert!(set.find_table("missing").is_none());
    }
}
