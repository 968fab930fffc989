//! Dense grid materialized from sparse cell records.

use std::collections::HashMap;

use serde_json::Value;
use tabula_model::{CellRecord, CellValue, Column, ColumnType};
use tabula_normalize::{ColumnOptions, column_options, normalize_record_value};

use crate::config::GridConfig;

/// One materialized cell.
///
/// `options` and `year` come from the owning column, never from the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub value: CellValue,
    /// Sanitized choices for list-typed columns.
    pub options: Option<Vec<String>>,
    /// Picker year for `calendar_weeks` columns.
    pub year: Option<i32>,
}

impl Cell {
    /// An empty cell carrying the column's structural facts.
    pub fn empty(column: &Column) -> Self {
        Self::for_column(column, CellValue::empty(column.column_type))
    }

    fn for_column(column: &Column, value: CellValue) -> Self {
        let options = column_options(column);
        Self {
            value,
            year: options.year(),
            options: match options {
                ColumnOptions::List(items) => Some(items),
                _ => None,
            },
        }
    }

    #[inline]
    pub fn column_type(&self) -> ColumnType {
        self.value.column_type()
    }
}

/// Rows of cells aligned positionally with the column list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    column_count: usize,
}

impl Grid {
    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> Option<&[Cell]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(column)
    }

    /// Replace one cell's value, leaving every other cell untouched.
    pub(crate) fn set_value(&mut self, row: usize, column: usize, value: CellValue) -> bool {
        match self.rows.get_mut(row).and_then(|cells| cells.get_mut(column)) {
            Some(cell) => {
                cell.value = value;
                true
            }
            None => false,
        }
    }

    /// Append a row of empty cells.
    pub(crate) fn push_empty_row(&mut self, columns: &[Column]) {
        self.rows.push(columns.iter().map(Cell::empty).collect());
    }
}

/// Build the dense grid for one table.
///
/// Row count is `max(highest row_index + 1, min_rows)`, capped at
/// [`GridConfig::MAX_ROWS`]. Every cell is the normalized record value, or
/// the column type's empty value when no record exists. Pure: equal inputs give equal grids.
pub fn materialize(columns: &[Column], records: &[CellRecord], config: &GridConfig) -> Grid {
    let (kept, skipped): (Vec<&CellRecord>, Vec<&CellRecord>) = records
        .iter()
        .partition(|record| record.row_index < GridConfig::MAX_ROWS);
    if let Some(highest) = skipped.iter().map(|record| record.row_index).max() {
        tracing::warn!(
            skipped = skipped.len(),
            highest,
            max_rows = GridConfig::MAX_ROWS,
            "Skipping records past the row limit"
        );
    }

    let lookup: HashMap<(u32, &str), &Value> = kept
        .iter()
        .map(|record| ((record.row_index, record.column_id.as_str()), &record.value))
        .collect();

    let row_count = kept
        .iter()
        .map(|record| record.row_index + 1)
        .max()
        .unwrap_or(0)
        .max(config.min_rows.min(GridConfig::MAX_ROWS));

    let templates: Vec<Cell> = columns.iter().map(Cell::empty).collect();
    let rows = (0..row_count)
        .map(|row| {
            columns
                .iter()
                .zip(&templates)
                .map(|(column, template)| {
                    let raw = lookup.get(&(row, column.id.as_str())).copied();
                    Cell {
                        value: normalize_record_value(column.column_type, raw),
                        ..template.clone()
                    }
                })
                .collect()
        })
        .collect();

    tracing::debug!(
        rows = row_count,
        columns = columns.len(),
        records = records.len(),
        "Materialized grid"
    );

    Grid {
        rows,
        column_count: columns.len(),
    }
}
