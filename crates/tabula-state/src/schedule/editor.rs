//! Weekly schedule sub-editor.
//!
//! Opened on one `weekly_schedule` cell, it works on a private draft. Each
//! entry moves between [`EntryState::Editing`] and [`EntryState::Confirmed`];
//! nothing reaches the cell until [`ScheduleEditor::save`] produces the new
//! value, and [`ScheduleEditor::cancel`] hands back the value it was opened
//! with.

use std::collections::HashMap;

use chrono::Utc;
use tabula_model::{
    CellValue, DayEntry, EntryState, Identity, NO_CATEGORY, WeeklySchedule, Weekday,
};
use tabula_normalize::dedup_choices;
use uuid::Uuid;

use crate::error::ScheduleError;

/// A field change on an entry in the editing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryField {
    Text(String),
    /// Blank categories fall back to [`NO_CATEGORY`].
    Category(String),
    /// Clamped to `0..=23`.
    Hours(i64),
    /// Clamped to `0..=59`.
    Minutes(i64),
}

/// Editing session for one weekly schedule cell.
#[derive(Debug, Clone)]
pub struct ScheduleEditor {
    original: Option<WeeklySchedule>,
    draft: WeeklySchedule,
    /// Last confirmed content of every entry that has been confirmed.
    confirmed: HashMap<String, DayEntry>,
    categories: Vec<String>,
    actor: Option<Identity>,
    faults: HashMap<String, ScheduleError>,
}

impl ScheduleEditor {
    /// Open the editor on a cell's current value.
    ///
    /// `category_options` is the column's sanitized option list; the editor
    /// offers it deduplicated. `actor` is stamped on every transition.
    pub fn open(
        value: Option<&WeeklySchedule>,
        category_options: &[String],
        actor: Option<Identity>,
    ) -> Self {
        let draft = value.cloned().unwrap_or_default();
        let confirmed = draft
            .days()
            .flat_map(|(_, entries)| entries.iter())
            .filter(|entry| entry.state() == EntryState::Confirmed)
            .map(|entry| (entry.id.clone(), entry.clone()))
            .collect();

        Self {
            original: value.cloned(),
            draft,
            confirmed,
            categories: dedup_choices(category_options),
            actor,
            faults: HashMap::new(),
        }
    }

    /// The draft as currently edited.
    pub fn schedule(&self) -> &WeeklySchedule {
        &self.draft
    }

    /// Category choices, deduplicated, without the sentinel.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn entry(&self, day: Weekday, entry_id: &str) -> Option<&DayEntry> {
        self.draft.entry(day, entry_id)
    }

    /// Append a fresh entry in the editing state and return its id.
    pub fn add_entry(&mut self, day: Weekday) -> String {
        let mut entry = DayEntry::new(Uuid::new_v4().to_string());
        self.stamp().apply(&mut entry);
        let id = entry.id.clone();
        tracing::debug!(day = %day, entry_id = %id, "Added schedule entry");
        self.draft.day_mut(day).push(entry);
        id
    }

    /// Editing → Confirmed.
    pub fn confirm(&mut self, day: Weekday, entry_id: &str) -> Result<(), ScheduleError> {
        self.check_state(day, entry_id, EntryState::Editing, "confirm")?;
        let stamp = self.stamp();
        if let Some(entry) = self.draft.entry_mut(day, entry_id) {
            entry.is_confirmed = true;
            entry.is_editing = false;
            stamp.apply(entry);
            self.confirmed.insert(entry.id.clone(), entry.clone());
        }
        Ok(())
    }

    /// Confirmed → Editing.
    pub fn edit(&mut self, day: Weekday, entry_id: &str) -> Result<(), ScheduleError> {
        self.check_state(day, entry_id, EntryState::Confirmed, "edit")?;
        let stamp = self.stamp();
        if let Some(entry) = self.draft.entry_mut(day, entry_id) {
            entry.is_confirmed = false;
            entry.is_editing = true;
            stamp.apply(entry);
        }
        Ok(())
    }

    /// Remove an entry in any state.
    pub fn delete(&mut self, day: Weekday, entry_id: &str) -> Result<(), ScheduleError> {
        let position = self
            .draft
            .day(day)
            .iter()
            .position(|entry| entry.id == entry_id);
        let Some(position) = position else {
            return Err(self.record_fault(ScheduleError::UnknownEntry {
                day,
                entry_id: entry_id.to_string(),
            }));
        };
        self.draft.day_mut(day).remove(position);
        self.confirmed.remove(entry_id);
        self.faults.remove(entry_id);
        tracing::debug!(day = %day, entry_id, "Deleted schedule entry");
        Ok(())
    }

    /// Change one field of an entry that is being edited.
    pub fn update_field(
        &mut self,
        day: Weekday,
        entry_id: &str,
        field: EntryField,
    ) -> Result<(), ScheduleError> {
        self.check_state(day, entry_id, EntryState::Editing, "update")?;
        let Some(entry) = self.draft.entry_mut(day, entry_id) else {
            return Ok(());
        };
        match field {
            EntryField::Text(text) => entry.text = text,
            EntryField::Category(category) if category.trim().is_empty() => {
                entry.category = NO_CATEGORY.to_string();
            }
            EntryField::Category(category) => entry.category = category,
            EntryField::Hours(hours) => entry.hours = clamp(hours, DayEntry::MAX_HOURS),
            EntryField::Minutes(minutes) => entry.minutes = clamp(minutes, DayEntry::MAX_MINUTES),
        }
        Ok(())
    }

    /// The error recorded for an entry, if its last action failed.
    pub fn fault(&self, entry_id: &str) -> Option<&ScheduleError> {
        self.faults.get(entry_id)
    }

    pub fn has_faults(&self) -> bool {
        !self.faults.is_empty()
    }

    /// Dismiss an entry's error so the user can retry.
    pub fn clear_fault(&mut self, entry_id: &str) -> Option<ScheduleError> {
        self.faults.remove(entry_id)
    }

    /// Discard every change and return the value the editor was opened with.
    pub fn cancel(self) -> CellValue {
        CellValue::WeeklySchedule(self.original)
    }

    /// Value to write back to the cell.
    ///
    /// Only confirmed content is kept: confirmed entries as they are, entries
    /// reopened for editing at their last confirmed content, and entries that
    /// were never confirmed not at all.
    pub fn save(self) -> CellValue {
        let mut saved = WeeklySchedule::default();
        for day in Weekday::ALL {
            *saved.day_mut(day) = self
                .draft
                .day(day)
                .iter()
                .filter_map(|entry| match entry.state() {
                    EntryState::Confirmed => Some(entry.clone()),
                    EntryState::Editing => self.confirmed.get(&entry.id).cloned(),
                })
                .collect();
        }
        tracing::debug!(entries = saved.entry_count(), "Saving weekly schedule");
        CellValue::WeeklySchedule(Some(saved))
    }

    /// Fail unless the entry exists and is in `expected` state. A passing
    /// check clears the entry's previous fault.
    fn check_state(
        &mut self,
        day: Weekday,
        entry_id: &str,
        expected: EntryState,
        action: &'static str,
    ) -> Result<(), ScheduleError> {
        let state = self.draft.entry(day, entry_id).map(DayEntry::state);
        let Some(state) = state else {
            return Err(self.record_fault(ScheduleError::UnknownEntry {
                day,
                entry_id: entry_id.to_string(),
            }));
        };
        if state != expected {
            return Err(self.record_fault(ScheduleError::InvalidTransition {
                entry_id: entry_id.to_string(),
                action,
                state,
            }));
        }
        self.faults.remove(entry_id);
        Ok(())
    }

    fn stamp(&self) -> Stamp {
        Stamp {
            by: self
                .actor
                .as_ref()
                .map(|actor| actor.attribution().to_string()),
            at: Utc::now().to_rfc3339(),
        }
    }

    fn record_fault(&mut self, error: ScheduleError) -> ScheduleError {
        tracing::warn!(entry_id = error.entry_id(), error = %error, "Schedule action refused");
        self.faults
            .insert(error.entry_id().to_string(), error.clone());
        error
    }
}

/// Edit attribution taken before an entry is borrowed mutably.
struct Stamp {
    by: Option<String>,
    at: String,
}

impl Stamp {
    fn apply(self, entry: &mut DayEntry) {
        if self.by.is_some() {
            entry.last_edited_by = self.by;
        }
        entry.last_edited_at = Some(self.at);
    }
}

fn clamp(value: i64, max: u8) -> u8 {
    // Clamped into 0..=max first, so the narrowing cannot truncate.
    value.clamp(0, i64::from(max)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> ScheduleEditor {
        ScheduleEditor::open(
            None,
            &["Meeting".into(), "Travel".into(), "Meeting".into()],
            Some(Identity::new("jdoe", "Jane Doe")),
        )
    }

    #[test]
    fn test_new_entry_defaults() {
        let mut editor = editor();
        let id = editor.add_entry(Weekday::Monday);
        let entry = editor.entry(Weekday::Monday, &id).unwrap();
        assert_eq!(entry.state(), EntryState::Editing);
        assert_eq!(entry.category, NO_CATEGORY);
        assert_eq!(entry.duration_minutes(), 0);
        assert_eq!(entry.last_edited_by.as_deref(), Some("Jane Doe"));
        assert!(entry.last_edited_at.is_some());
    }

    #[test]
    fn test_categories_are_deduplicated() {
        assert_eq!(editor().categories(), ["Meeting", "Travel"]);
    }

    #[test]
    fn test_confirm_then_edit() {
        let mut editor = editor();
        let id = editor.add_entry(Weekday::Tuesday);
        editor.confirm(Weekday::Tuesday, &id).unwrap();
        assert_eq!(
            editor.entry(Weekday::Tuesday, &id).unwrap().state(),
            EntryState::Confirmed
        );

        editor.edit(Weekday::Tuesday, &id).unwrap();
        assert_eq!(
            editor.entry(Weekday::Tuesday, &id).unwrap().state(),
            EntryState::Editing
        );
    }

    #[test]
    fn test_fields_clamp_and_fall_back() {
        let mut editor = editor();
        let id = editor.add_entry(Weekday::Friday);
        editor
            .update_field(Weekday::Friday, &id, EntryField::Hours(40))
            .unwrap();
        editor
            .update_field(Weekday::Friday, &id, EntryField::Minutes(-3))
            .unwrap();
        editor
            .update_field(Weekday::Friday, &id, EntryField::Category("  ".into()))
            .unwrap();

        let entry = editor.entry(Weekday::Friday, &id).unwrap();
        assert_eq!(entry.hours, 23);
        assert_eq!(entry.minutes, 0);
        assert_eq!(entry.category, NO_CATEGORY);
    }

    #[test]
    fn test_confirmed_entry_rejects_field_updates() {
        let mut editor = editor();
        let id = editor.add_entry(Weekday::Monday);
        editor.confirm(Weekday::Monday, &id).unwrap();

        let err = editor
            .update_field(Weekday::Monday, &id, EntryField::Text("late".into()))
            .unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InvalidTransition {
                action: "update",
                state: EntryState::Confirmed,
                ..
            }
        ));
        assert_eq!(editor.fault(&id), Some(&err));
        assert_eq!(editor.entry(Weekday::Monday, &id).unwrap().text, "");
    }

    #[test]
    fn test_fault_is_scoped_and_clearable() {
        let mut editor = editor();
        let good = editor.add_entry(Weekday::Monday);
        let err = editor.confirm(Weekday::Monday, "missing").unwrap_err();
        assert_eq!(err.entry_id(), "missing");

        // Other entries stay usable.
        editor.confirm(Weekday::Monday, &good).unwrap();
        assert!(editor.fault(&good).is_none());

        assert!(editor.clear_fault("missing").is_some());
        assert!(!editor.has_faults());
    }

    #[test]
    fn test_delete_in_any_state() {
        let mut editor = editor();
        let a = editor.add_entry(Weekday::Wednesday);
        let b = editor.add_entry(Weekday::Wednesday);
        editor.confirm(Weekday::Wednesday, &b).unwrap();

        editor.delete(Weekday::Wednesday, &a).unwrap();
        editor.delete(Weekday::Wednesday, &b).unwrap();
        assert!(editor.schedule().wednesday.is_empty());
        assert!(editor.delete(Weekday::Wednesday, &a).is_err());
    }

    #[test]
    fn test_anonymous_actor_still_stamps_time() {
        let mut editor = ScheduleEditor::open(None, &[], None);
        let id = editor.add_entry(Weekday::Monday);
        let entry = editor.entry(Weekday::Monday, &id).unwrap();
        assert_eq!(entry.last_edited_by, None);
        assert!(entry.last_edited_at.is_some());
    }
}
