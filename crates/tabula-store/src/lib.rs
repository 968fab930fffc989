//! Reference backends for Tabula.
//!
//! The table core talks to its data through [`tabula_model::TableBackend`].
//! This crate provides two implementations over the same [`TableSet`] rules:
//!
//! - [`MemoryBackend`]: data held in memory, with write fault injection
//! - [`FileBackend`]: every write saved atomically to a JSON file
//!
//! # File Format
//!
//! A table file is a JSON object:
//!
//! ```text
//! {
//!   "version": 1,
//!   "tables":   [{"id", "name"}],
//!   "columns":  [{"id", "table_id", "name", "column_type", "column_order", "options"}],
//!   "records":  [{"table_id", "row_index", "column_id", "value"}],
//!   "profiles": [{"id", "username", "full_name"}]
//! }
//! ```

mod error;
mod file;
mod io;
mod memory;
mod tables;

pub use error::{Result, StoreError};
pub use file::FileBackend;
pub use io::{load_or_default, load_tables, save_tables, save_tables_async};
pub use memory::MemoryBackend;
pub use tables::{CURRENT_VERSION, TableInfo, TableSet, TableStats};
