//! Weekly schedule payload repair.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tabula_model::{DayEntry, NO_CATEGORY, WeeklySchedule, Weekday};

use crate::legacy::migrate_legacy_schedule;

/// Repair a stored `weekly_schedule` payload.
///
/// `null` (and the empty string older grids wrote for empty cells) mean "no
/// schedule". Any object becomes a schedule with all five weekdays; entries
/// that are not objects are dropped, numeric fields are clamped and blank
/// categories fall back to [`NO_CATEGORY`].
pub fn normalize_schedule(raw: &Value) -> Option<WeeklySchedule> {
    let migrated = migrate_legacy_schedule(raw);
    let Value::Object(days) = migrated.as_ref() else {
        match raw {
            Value::Null => {}
            Value::String(s) if s.is_empty() => {}
            other => tracing::warn!(value = %other, "Discarding malformed weekly schedule"),
        }
        return None;
    };

    let mut schedule = WeeklySchedule::default();
    let mut seen_ids = HashSet::new();
    for day in Weekday::ALL {
        let entries = match days.get(day.key()) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| normalize_entry(day, index, item, &mut seen_ids))
                .collect(),
            Some(other) => {
                tracing::warn!(day = %day, value = %other, "Discarding malformed weekday entries");
                Vec::new()
            }
        };
        *schedule.day_mut(day) = entries;
    }
    Some(schedule)
}

fn normalize_entry(
    day: Weekday,
    index: usize,
    item: &Value,
    seen_ids: &mut HashSet<String>,
) -> Option<DayEntry> {
    let Value::Object(entry) = item else {
        tracing::warn!(day = %day, index, "Dropping non-object schedule entry");
        return None;
    };

    let is_confirmed = entry
        .get("isConfirmed")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    // An entry that is neither confirmed nor editing has no valid state; it
    // reopens for editing.
    let is_editing = entry
        .get("isEditing")
        .and_then(Value::as_bool)
        .unwrap_or(!is_confirmed)
        || !is_confirmed;

    Some(DayEntry {
        id: unique_id(entry.get("id"), day, index, seen_ids),
        text: entry
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        category: category(entry),
        hours: clamp_component(entry.get("hours"), DayEntry::MAX_HOURS),
        minutes: clamp_component(entry.get("minutes"), DayEntry::MAX_MINUTES),
        is_confirmed,
        is_editing,
        last_edited_by: optional_string(entry, "lastEditedBy"),
        last_edited_at: optional_string(entry, "lastEditedAt"),
    })
}

/// Keep a stored id when usable, otherwise derive one from the position.
fn unique_id(
    raw: Option<&Value>,
    day: Weekday,
    index: usize,
    seen_ids: &mut HashSet<String>,
) -> String {
    let stored = match raw {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    };

    let mut id = match stored {
        Some(id) if !seen_ids.contains(&id) => id,
        _ => format!("{}-{}", day.key(), index),
    };
    let mut suffix = 1;
    while seen_ids.contains(&id) {
        id = format!("{}-{}-{}", day.key(), index, suffix);
        suffix += 1;
    }
    seen_ids.insert(id.clone());
    id
}

fn category(entry: &Map<String, Value>) -> String {
    entry
        .get("category")
        .and_then(Value::as_str)
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(NO_CATEGORY)
        .to_string()
}

fn clamp_component(raw: Option<&Value>, max: u8) -> u8 {
    let Some(Value::Number(n)) = raw else {
        return 0;
    };
    let whole = match n.as_i64() {
        Some(i) => i,
        None => n.as_f64().filter(|f| f.is_finite()).map_or(0, |f| f.trunc() as i64),
    };
    // Clamped into 0..=max, so the narrowing cannot truncate.
    whole.clamp(0, i64::from(max)) as u8
}

fn optional_string(entry: &Map<String, Value>, key: &str) -> Option<String> {
    entry.get(key).and_then(Value::as_str).map(str::to_string)
}
