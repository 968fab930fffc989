//! Column Registry entries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParseColumnTypeError;

/// Declared type of a column.
///
/// The set is closed: every cell value in the grid is one of these shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Checkbox,
    Select,
    PdfUpload,
    CalendarWeeks,
    WeeklySchedule,
    UserDropdown,
}

impl ColumnType {
    /// All column types in declaration order.
    pub const ALL: [ColumnType; 7] = [
        Self::Text,
        Self::Checkbox,
        Self::Select,
        Self::PdfUpload,
        Self::CalendarWeeks,
        Self::WeeklySchedule,
        Self::UserDropdown,
    ];

    /// Wire name as stored by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Checkbox => "checkbox",
            Self::Select => "select",
            Self::PdfUpload => "pdf_upload",
            Self::CalendarWeeks => "calendar_weeks",
            Self::WeeklySchedule => "weekly_schedule",
            Self::UserDropdown => "user_dropdown",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Checkbox => "Checkbox",
            Self::Select => "Dropdown",
            Self::PdfUpload => "PDF upload",
            Self::CalendarWeeks => "Calendar weeks",
            Self::WeeklySchedule => "Weekly schedule",
            Self::UserDropdown => "User",
        }
    }

    /// Whether `options` holds a list of strings for this type.
    #[inline]
    pub fn uses_option_list(&self) -> bool {
        matches!(
            self,
            Self::Select | Self::WeeklySchedule | Self::UserDropdown
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = ParseColumnTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str() == wanted)
            .ok_or_else(|| ParseColumnTypeError(s.to_string()))
    }
}

/// A column as stored in the registry.
///
/// `options` is left as raw JSON; its meaning depends on `column_type`
/// (a string list for list types, `{"year": n}` for calendar weeks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub table_id: String,
    pub name: String,
    pub column_type: ColumnType,
    /// Position within the table. New columns get `max + 1`.
    #[serde(rename = "column_order")]
    pub order: i64,
    #[serde(default)]
    pub options: Option<Value>,
}

impl Column {
    /// Create a plain text column with no options.
    pub fn new(
        id: impl Into<String>,
        table_id: impl Into<String>,
        name: impl Into<String>,
        order: i64,
    ) -> Self {
        Self {
            id: id.into(),
            table_id: table_id.into(),
            name: name.into(),
            column_type: ColumnType::Text,
            order,
            options: None,
        }
    }

    /// Builder: set the column type.
    #[must_use]
    pub fn with_type(mut self, column_type: ColumnType) -> Self {
        self.column_type = column_type;
        self
    }

    /// Builder: set the raw options payload.
    #[must_use]
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }
}
