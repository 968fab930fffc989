//! Totals shown for a weekly schedule cell.

use tabula_model::{CellValue, EntryState, WeeklySchedule, Weekday};

/// Label of a cell without any confirmed entry.
pub const EMPTY_LABEL: &str = "Eintrag";

/// Confirmed-only aggregates of a schedule.
///
/// Entries that are still being edited are ignored entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleSummary {
    /// Minutes per weekday, Monday first.
    day_minutes: [u32; 5],
    confirmed_entries: usize,
}

impl ScheduleSummary {
    pub fn of(schedule: &WeeklySchedule) -> Self {
        let mut summary = Self::default();
        for (index, (_, entries)) in schedule.days().enumerate() {
            for entry in entries {
                if entry.state() == EntryState::Confirmed {
                    summary.day_minutes[index] += entry.duration_minutes();
                    summary.confirmed_entries += 1;
                }
            }
        }
        summary
    }

    /// Summary of a cell value; `None` for non-schedule values.
    pub fn of_value(value: &CellValue) -> Option<Self> {
        match value {
            CellValue::WeeklySchedule(schedule) => {
                Some(schedule.as_ref().map(Self::of).unwrap_or_default())
            }
            _ => None,
        }
    }

    pub fn total_minutes(&self) -> u32 {
        self.day_minutes.iter().sum()
    }

    pub fn confirmed_entries(&self) -> usize {
        self.confirmed_entries
    }

    pub fn day_minutes(&self, day: Weekday) -> u32 {
        Weekday::ALL
            .iter()
            .position(|d| *d == day)
            .map_or(0, |index| self.day_minutes[index])
    }

    /// Text shown in the grid cell: `Woche: H:MM`, or [`EMPTY_LABEL`].
    pub fn cell_label(&self) -> String {
        if self.confirmed_entries == 0 {
            EMPTY_LABEL.to_string()
        } else {
            format!("Woche: {}", format_duration(self.total_minutes()))
        }
    }
}

/// `H:MM` with zero-padded minutes.
pub fn format_duration(minutes: u32) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}
