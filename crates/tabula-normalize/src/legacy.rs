//! Migration of the single-object weekly schedule shape.
//!
//! Before entry lists existed, a schedule cell stored exactly one object per
//! weekday:
//!
//! ```text
//! {"monday": {"text": "x", "category": "", "hours": 2, "minutes": 0}, "tuesday": {}, ...}
//! ```
//!
//! Such objects have no `id`, `isConfirmed` or `isEditing`. They are upgraded
//! to a one-element list holding a confirmed entry, or to an empty list when
//! every field is blank. This runs before schedule normalization so the
//! normalizer itself only ever sees entry lists.

use std::borrow::Cow;

use serde_json::{Map, Value, json};
use tabula_model::{NO_CATEGORY, Weekday};

const ENTRY_KEYS: [&str; 3] = ["id", "isConfirmed", "isEditing"];

/// Whether a weekday object predates entry lists.
pub fn is_legacy_entry(entry: &Map<String, Value>) -> bool {
    !ENTRY_KEYS.iter().any(|key| entry.contains_key(*key))
}

/// Rewrite every single-object weekday of a schedule payload into a list.
///
/// Returns the input untouched (borrowed) when nothing needs migrating.
/// A single object that already has the entry shape is wrapped as-is.
pub fn migrate_legacy_schedule(raw: &Value) -> Cow<'_, Value> {
    let Value::Object(days) = raw else {
        return Cow::Borrowed(raw);
    };
    let needs_migration = Weekday::ALL
        .iter()
        .any(|day| matches!(days.get(day.key()), Some(Value::Object(_))));
    if !needs_migration {
        return Cow::Borrowed(raw);
    }

    let mut migrated = days.clone();
    for day in Weekday::ALL {
        let Some(Value::Object(entry)) = days.get(day.key()) else {
            continue;
        };
        let list = if is_legacy_entry(entry) {
            upgrade_legacy_entry(day, entry).into_iter().collect()
        } else {
            vec![Value::Object(entry.clone())]
        };
        migrated.insert(day.key().to_string(), Value::Array(list));
    }
    Cow::Owned(Value::Object(migrated))
}

/// Upgrade one legacy weekday object, or `None` if it carries no data.
fn upgrade_legacy_entry(day: Weekday, entry: &Map<String, Value>) -> Option<Value> {
    if !has_content(entry) {
        return None;
    }
    tracing::debug!(day = %day, "Upgrading legacy schedule entry");

    let category = entry
        .get("category")
        .and_then(Value::as_str)
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(NO_CATEGORY);

    Some(json!({
        "id": format!("legacy-{}", day.key()),
        "text": entry.get("text").cloned().unwrap_or(Value::Null),
        "category": category,
        "hours": entry.get("hours").cloned().unwrap_or(Value::Null),
        "minutes": entry.get("minutes").cloned().unwrap_or(Value::Null),
        "isConfirmed": true,
        "isEditing": false,
    }))
}

fn has_content(entry: &Map<String, Value>) -> bool {
    let non_blank = |key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty())
    };
    let positive = |key: &str| {
        entry
            .get(key)
            .and_then(Value::as_f64)
            .is_some_and(|n| n > 0.0)
    };
    non_blank("text") || non_blank("category") || positive("hours") || positive("minutes")
}
