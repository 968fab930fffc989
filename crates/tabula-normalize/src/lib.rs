//! Value normalization for Tabula cells.
//!
//! Persisted cell values and column options are untyped JSON written by
//! several generations of the UI. This crate maps any such payload onto the
//! closed set of canonical shapes in [`tabula_model::CellValue`].
//!
//! # Overview
//!
//! - **Cell values** ([`normalize`]): total per-type repair; malformed input
//!   degrades to the type's empty value and is logged, never raised
//! - **Options** ([`sanitize_options`], [`column_options`]): string-list
//!   cleanup and typed access to a column's option payload
//! - **Legacy migration** ([`migrate_legacy_schedule`]): upgrades the
//!   single-object-per-weekday schedule shape to entry lists
//! - **Upload checks** ([`validate_pdf_upload`], [`sanitize_file_name`])
//!
//! # Design Principles
//!
//! - **Total**: no function here returns an error for bad cell data
//! - **Registry-driven**: the column type decides the shape, never the payload
//! - **Deterministic**: repaired ids are derived from position, so repeated
//!   normalization of the same input yields equal values

mod legacy;
mod options;
mod schedule;
mod upload;
mod value;

pub use legacy::{is_legacy_entry, migrate_legacy_schedule};
pub use options::{
    ColumnOptions, column_options, dedup_choices, process_column_options, sanitize_options,
};
pub use schedule::normalize_schedule;
pub use upload::{
    MAX_UPLOAD_BYTES, PDF_MAGIC, PDF_MIME, UploadCheck, UploadIssue, sanitize_file_name,
    validate_pdf_upload,
};
pub use value::{normalize, normalize_record_value};
