//! Weekly schedule editing and aggregation.

mod editor;
mod summary;

pub use editor::{EntryField, ScheduleEditor};
pub use summary::{EMPTY_LABEL, ScheduleSummary, format_duration};
