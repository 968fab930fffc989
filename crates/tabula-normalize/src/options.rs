//! Column option handling.
//!
//! List-typed columns (`select`, `weekly_schedule`, `user_dropdown`) store
//! their choices as a JSON array; `calendar_weeks` stores `{"year": n}`.
//! Storage keeps duplicates; pickers present [`dedup_choices`].

use serde_json::{Value, json};
use tabula_model::{Column, ColumnType};

/// Typed view of a column's `options` payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnOptions {
    #[default]
    None,
    /// Sanitized choices of a list-typed column.
    List(Vec<String>),
    /// Year shown by a calendar-week picker.
    Year(i32),
}

impl ColumnOptions {
    pub fn list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn year(&self) -> Option<i32> {
        match self {
            Self::Year(year) => Some(*year),
            _ => None,
        }
    }
}

/// Clean a raw option list.
///
/// Keeps non-null entries, renders scalars as strings, trims them and drops
/// the ones left empty. Order and duplicates are preserved, so applying this
/// twice gives the same result as applying it once.
pub fn sanitize_options(raw: Option<&Value>) -> Vec<String> {
    let items = match raw {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            tracing::warn!(options = %other, "Ignoring non-list column options");
            return Vec::new();
        }
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::Null => None,
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Array(_) | Value::Object(_) => {
                tracing::warn!(option = %item, "Dropping structured option entry");
                None
            }
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Choices as presented by a picker: first occurrence wins, order kept.
pub fn dedup_choices(options: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    options
        .iter()
        .filter(|option| seen.insert(option.as_str()))
        .cloned()
        .collect()
}

/// Typed options of a column, derived from its declared type.
pub fn column_options(column: &Column) -> ColumnOptions {
    let raw = column.options.as_ref();
    match column.column_type {
        ty if ty.uses_option_list() => ColumnOptions::List(sanitize_options(raw)),
        ColumnType::CalendarWeeks => {
            calendar_year(raw).map_or(ColumnOptions::None, ColumnOptions::Year)
        }
        _ => ColumnOptions::None,
    }
}

/// Options payload to send with a column type change.
///
/// List types send their sanitized list, or nothing when it is empty.
/// Calendar weeks send `{"year": n}` only for a non-zero year. Every other
/// type carries no options.
pub fn process_column_options(column_type: ColumnType, raw: Option<&Value>) -> Option<Value> {
    match column_type {
        ty if ty.uses_option_list() => {
            let items = sanitize_options(raw);
            (!items.is_empty()).then(|| json!(items))
        }
        ColumnType::CalendarWeeks => calendar_year(raw)
            .filter(|year| *year != 0)
            .map(|year| json!({ "year": year })),
        _ => None,
    }
}

fn calendar_year(raw: Option<&Value>) -> Option<i32> {
    let year = raw?.get("year")?;
    match year {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_mixed_list() {
        let raw = json!([1, "", " a ", null, "a"]);
        assert_eq!(sanitize_options(Some(&raw)), vec!["1", "a", "a"]);
    }

    #[test]
    fn test_sanitize_null_and_non_list() {
        assert!(sanitize_options(None).is_empty());
        assert!(sanitize_options(Some(&Value::Null)).is_empty());
        assert!(sanitize_options(Some(&json!({"year": 2024}))).is_empty());
    }

    #[test]
    fn test_sanitize_drops_structured_entries() {
        let raw = json!(["x", ["nested"], {"k": 1}, true]);
        assert_eq!(sanitize_options(Some(&raw)), vec!["x", "true"]);
    }

    #[test]
    fn test_dedup_choices_keeps_first_occurrence() {
        let options = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(dedup_choices(&options), vec!["b", "a"]);
    }

    #[test]
    fn test_column_options_by_type() {
        let select = Column::new("c1", "t1", "Status", 0)
            .with_type(ColumnType::Select)
            .with_options(json!(["open", " done "]));
        assert_eq!(
            column_options(&select),
            ColumnOptions::List(vec!["open".into(), "done".into()])
        );

        let weeks = Column::new("c2", "t1", "Week", 1)
            .with_type(ColumnType::CalendarWeeks)
            .with_options(json!({"year": 2025}));
        assert_eq!(column_options(&weeks).year(), Some(2025));

        // Stale list options on a text column are ignored.
        let text = Column::new("c3", "t1", "Notes", 2).with_options(json!(["x"]));
        assert_eq!(column_options(&text), ColumnOptions::None);
    }

    #[test]
    fn test_process_column_options() {
        let raw = json!(["", "  "]);
        assert_eq!(process_column_options(ColumnType::Select, Some(&raw)), None);

        let raw = json!(["a", null, "b"]);
        assert_eq!(
            process_column_options(ColumnType::UserDropdown, Some(&raw)),
            Some(json!(["a", "b"]))
        );

        let raw = json!({"year": 2024, "extra": true});
        assert_eq!(
            process_column_options(ColumnType::CalendarWeeks, Some(&raw)),
            Some(json!({"year": 2024}))
        );
        assert_eq!(
            process_column_options(ColumnType::CalendarWeeks, Some(&json!({"year": 0}))),
            None
        );
        assert_eq!(
            process_column_options(ColumnType::Checkbox, Some(&json!(["a"]))),
            None
        );
    }
}
