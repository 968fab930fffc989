//! Client-side table state for Tabula.
//!
//! This crate turns the backend's sparse cell records into the dense grid a
//! table view works on, and keeps that grid consistent while edits are in
//! flight.
//!
//! # Overview
//!
//! - **Materialization** ([`materialize`]): columns + records → [`Grid`],
//!   with a floor of [`GridConfig::min_rows`] rows
//! - **Table view** ([`TableView`]): optimistic cell edits with rollback to
//!   the last confirmed records, mode gating, structural operations and
//!   user notices
//! - **Weekly schedules** ([`ScheduleEditor`], [`ScheduleSummary`]): the
//!   per-entry editing/confirmed state machine and confirmed-only totals
//!
//! # Example
//!
//! ```ignore
//! use tabula_state::{GridConfig, TableView};
//!
//! let mut view = TableView::load(&backend, "table-1", AccessLevel::Editor, GridConfig::default()).await?;
//! view.set_mode(TableMode::Edit)?;
//! let outcome = view.update_cell(&backend, 0, 1, CellValue::Checkbox(true)).await?;
//! for notice in view.drain_notices() {
//!     println!("{notice}");
//! }
//! ```

mod choices;
mod config;
mod error;
mod grid;
mod notice;
mod schedule;
mod versioned;
mod view;

pub use choices::{cell_choices, user_choices};
pub use config::GridConfig;
pub use error::{Result, ScheduleError, StateError};
pub use grid::{Cell, Grid, materialize};
pub use notice::{Notice, Severity};
pub use schedule::{EMPTY_LABEL, EntryField, ScheduleEditor, ScheduleSummary, format_duration};
pub use versioned::Versioned;
pub use view::{EditOutcome, PendingEdit, TableView};
