//! Persisted cell records and canonical cell values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::column::ColumnType;
use crate::schedule::WeeklySchedule;

/// A persisted, non-empty cell.
///
/// Unique per `(table_id, row_index, column_id)`. A missing record means the
/// cell is empty, not zero or false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub table_id: String,
    pub row_index: u32,
    pub column_id: String,
    #[serde(default)]
    pub value: Value,
}

impl CellRecord {
    pub fn new(
        table_id: impl Into<String>,
        row_index: u32,
        column_id: impl Into<String>,
        value: Value,
    ) -> Self {
        Self {
            table_id: table_id.into(),
            row_index,
            column_id: column_id.into(),
            value,
        }
    }

    /// Whether this record occupies the given grid coordinate.
    #[inline]
    pub fn is_at(&self, row_index: u32, column_id: &str) -> bool {
        self.row_index == row_index && self.column_id == column_id
    }
}

/// Canonical in-memory value of a cell, one variant per column type.
///
/// The variant always matches the owning column's type; the grid never holds
/// a text value under a checkbox column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Text(String),
    Checkbox(bool),
    /// One of the column options, or a stale value no longer in the list.
    Select(String),
    /// Opaque storage path of the uploaded file.
    PdfUpload(Option<String>),
    /// `KW<week>-<year>` or empty.
    CalendarWeeks(String),
    /// Username of the selected user.
    UserDropdown(String),
    WeeklySchedule(Option<WeeklySchedule>),
}

impl CellValue {
    /// The value an empty cell of this type shows.
    pub fn empty(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Text => Self::Text(String::new()),
            ColumnType::Checkbox => Self::Checkbox(false),
            ColumnType::Select => Self::Select(String::new()),
            ColumnType::PdfUpload => Self::PdfUpload(None),
            ColumnType::CalendarWeeks => Self::CalendarWeeks(String::new()),
            ColumnType::UserDropdown => Self::UserDropdown(String::new()),
            ColumnType::WeeklySchedule => Self::WeeklySchedule(None),
        }
    }

    /// Column type this value belongs to.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Text(_) => ColumnType::Text,
            Self::Checkbox(_) => ColumnType::Checkbox,
            Self::Select(_) => ColumnType::Select,
            Self::PdfUpload(_) => ColumnType::PdfUpload,
            Self::CalendarWeeks(_) => ColumnType::CalendarWeeks,
            Self::UserDropdown(_) => ColumnType::UserDropdown,
            Self::WeeklySchedule(_) => ColumnType::WeeklySchedule,
        }
    }

    /// Whether this equals the empty default of its type.
    pub fn is_empty(&self) -> bool {
        *self == Self::empty(self.column_type())
    }

    /// String payload for the scalar text-like variants.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Select(s) | Self::CalendarWeeks(s) | Self::UserDropdown(s) => {
                Some(s.as_str())
            }
            Self::PdfUpload(path) => path.as_deref(),
            Self::Checkbox(_) | Self::WeeklySchedule(_) => None,
        }
    }

    /// JSON payload sent to the backend for this value.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(s) | Self::Select(s) | Self::CalendarWeeks(s) | Self::UserDropdown(s) => {
                Value::String(s.clone())
            }
            Self::Checkbox(checked) => Value::Bool(*checked),
            Self::PdfUpload(path) => path.clone().map_or(Value::Null, Value::String),
            Self::WeeklySchedule(schedule) => {
                schedule.as_ref().map_or(Value::Null, WeeklySchedule::to_json)
            }
        }
    }
}
