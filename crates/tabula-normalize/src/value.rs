//! Per-type cell value normalization.

use serde_json::Value;
use tabula_model::{CellValue, ColumnType};

use crate::schedule::normalize_schedule;

/// Map any stored payload onto the canonical value for `column_type`.
///
/// Never fails: anything that cannot be interpreted becomes the type's empty
/// value and is logged at `warn`.
pub fn normalize(column_type: ColumnType, raw: &Value) -> CellValue {
    match column_type {
        ColumnType::Text => CellValue::Text(scalar_text(column_type, raw)),
        ColumnType::Select => CellValue::Select(scalar_text(column_type, raw)),
        ColumnType::UserDropdown => CellValue::UserDropdown(scalar_text(column_type, raw)),
        ColumnType::Checkbox => CellValue::Checkbox(match raw {
            Value::Bool(checked) => *checked,
            Value::String(s) => s == "true",
            _ => false,
        }),
        ColumnType::PdfUpload => CellValue::PdfUpload(match raw {
            Value::String(path) => Some(path.clone()),
            Value::Null => None,
            other => {
                tracing::warn!(value = %other, "Discarding malformed file reference");
                None
            }
        }),
        ColumnType::CalendarWeeks => CellValue::CalendarWeeks(match raw {
            Value::String(week) => week.clone(),
            Value::Null => String::new(),
            other => {
                tracing::warn!(value = %other, "Discarding malformed calendar week");
                String::new()
            }
        }),
        ColumnType::WeeklySchedule => CellValue::WeeklySchedule(normalize_schedule(raw)),
    }
}

/// Normalize the value of a possibly missing record.
///
/// A missing record is an empty cell.
pub fn normalize_record_value(column_type: ColumnType, raw: Option<&Value>) -> CellValue {
    match raw {
        Some(raw) => normalize(column_type, raw),
        None => CellValue::empty(column_type),
    }
}

fn scalar_text(column_type: ColumnType, raw: &Value) -> String {
    match raw {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) | Value::Object(_) => {
            tracing::warn!(column_type = %column_type, value = %raw, "Discarding structured value");
            String::new()
        }
    }
}
