//! Weekly schedule values.
//!
//! A `weekly_schedule` cell holds, for each working day, an ordered list of
//! [`DayEntry`] items. Each entry is either being edited or confirmed; only
//! confirmed entries count toward the totals shown in the grid.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel category meaning "no category selected".
pub const NO_CATEGORY: &str = "no-category";

/// Working day of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    /// Monday through Friday.
    pub const ALL: [Weekday; 5] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
    ];

    /// JSON key of this day inside a schedule object.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Monday => "Montag",
            Self::Tuesday => "Dienstag",
            Self::Wednesday => "Mittwoch",
            Self::Thursday => "Donnerstag",
            Self::Friday => "Freitag",
        }
    }

    /// Look a day up by its JSON key.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|day| day.key() == key)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Lifecycle state of a single entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Fields may change; not part of the totals.
    Editing,
    /// Read-only summary; counted in the totals.
    Confirmed,
}

/// One schedule item within a weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayEntry {
    /// Unique within the owning cell.
    pub id: String,
    pub text: String,
    /// Category name, or [`NO_CATEGORY`].
    pub category: String,
    /// 0..=23
    pub hours: u8,
    /// 0..=59
    pub minutes: u8,
    pub is_confirmed: bool,
    pub is_editing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_by: Option<String>,
    /// RFC 3339 timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_edited_at: Option<String>,
}

impl DayEntry {
    pub const MAX_HOURS: u8 = 23;
    pub const MAX_MINUTES: u8 = 59;

    /// A fresh entry in the editing state with zero duration and no category.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: String::new(),
            category: NO_CATEGORY.to_string(),
            hours: 0,
            minutes: 0,
            is_confirmed: false,
            is_editing: true,
            last_edited_by: None,
            last_edited_at: None,
        }
    }

    pub fn state(&self) -> EntryState {
        if self.is_confirmed && !self.is_editing {
            EntryState::Confirmed
        } else {
            EntryState::Editing
        }
    }

    /// Duration in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        u32::from(self.hours) * 60 + u32::from(self.minutes)
    }

    pub fn has_category(&self) -> bool {
        self.category != NO_CATEGORY
    }
}

/// Per-weekday entry lists of a `weekly_schedule` cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    #[serde(default)]
    pub monday: Vec<DayEntry>,
    #[serde(default)]
    pub tuesday: Vec<DayEntry>,
    #[serde(default)]
    pub wednesday: Vec<DayEntry>,
    #[serde(default)]
    pub thursday: Vec<DayEntry>,
    #[serde(default)]
    pub friday: Vec<DayEntry>,
}

impl WeeklySchedule {
    pub fn day(&self, day: Weekday) -> &[DayEntry] {
        match day {
            Weekday::Monday => &self.monday,
            Weekday::Tuesday => &self.tuesday,
            Weekday::Wednesday => &self.wednesday,
            Weekday::Thursday => &self.thursday,
            Weekday::Friday => &self.friday,
        }
    }

    pub fn day_mut(&mut self, day: Weekday) -> &mut Vec<DayEntry> {
        match day {
            Weekday::Monday => &mut self.monday,
            Weekday::Tuesday => &mut self.tuesday,
            Weekday::Wednesday => &mut self.wednesday,
            Weekday::Thursday => &mut self.thursday,
            Weekday::Friday => &mut self.friday,
        }
    }

    /// Iterate `(day, entries)` from Monday to Friday.
    pub fn days(&self) -> impl Iterator<Item = (Weekday, &[DayEntry])> {
        Weekday::ALL.into_iter().map(|day| (day, self.day(day)))
    }

    /// Find an entry by id on the given day.
    pub fn entry(&self, day: Weekday, id: &str) -> Option<&DayEntry> {
        self.day(day).iter().find(|entry| entry.id == id)
    }

    pub fn entry_mut(&mut self, day: Weekday, id: &str) -> Option<&mut DayEntry> {
        self.day_mut(day).iter_mut().find(|entry| entry.id == id)
    }

    /// Total number of entries across all days, in any state.
    pub fn entry_count(&self) -> usize {
        self.days().map(|(_, entries)| entries.len()).sum()
    }

    /// JSON payload stored in the cell record.
    pub fn to_json(&self) -> Value {
        // Plain structs with string keys always serialize.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
