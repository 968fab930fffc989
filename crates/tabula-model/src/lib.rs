//! Shared data model for Tabula tables.
//!
//! This crate holds the types every other Tabula crate speaks:
//!
//! - [`column`]: Column Registry entries and the closed set of column types
//! - [`cell`]: persisted cell records and the canonical in-memory cell value
//! - [`schedule`]: weekday entry lists for `weekly_schedule` columns
//! - [`calendar`]: `KW<week>-<year>` values for `calendar_weeks` columns
//! - [`access`]: table modes and per-user access levels
//! - [`identity`]: the acting user and the profile directory
//! - [`backend`]: the narrow interface to the hosted table service
//!
//! Persisted payloads (`Column::options`, `CellRecord::value`) stay as raw
//! `serde_json::Value` here. Turning them into typed values is the job of
//! `tabula-normalize`.

pub mod access;
pub mod backend;
pub mod calendar;
pub mod cell;
pub mod column;
pub mod error;
pub mod identity;
pub mod schedule;

pub use access::{AccessLevel, TableMode};
pub use backend::TableBackend;
pub use calendar::{
    CalendarWeek, calendar_weeks, format_calendar_week, parse_calendar_week, weeks_in_year,
};
pub use cell::{CellRecord, CellValue};
pub use column::{Column, ColumnType};
pub use error::{BackendError, ParseColumnTypeError};
pub use identity::{Identity, Profile};
pub use schedule::{DayEntry, EntryState, NO_CATEGORY, WeeklySchedule, Weekday};
