//! Error types for table state operations.
//!
//! Cell-level data problems never show up here; the normalizer repairs those
//! silently. These errors cover refused operations and backend failures.

use tabula_model::{AccessLevel, BackendError, ColumnType, EntryState, TableMode, Weekday};
use thiserror::Error;

/// Failure of a table view operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StateError {
    /// The current mode does not offer the operation. Nothing was sent.
    #[error("{operation} is not available in {mode:?} mode")]
    ModeDenied {
        /// Refused operation.
        operation: &'static str,
        /// Mode the view was in.
        mode: TableMode,
    },

    /// The user's access level does not include the requested mode.
    #[error("{access:?} access does not allow {mode:?} mode")]
    AccessDenied {
        /// Access level of the current user.
        access: AccessLevel,
        /// Requested mode.
        mode: TableMode,
    },

    /// A value of one column type was written to a column of another.
    #[error("cannot write a {found} value to a {expected} column")]
    TypeMismatch {
        /// Type of the target column.
        expected: ColumnType,
        /// Type of the supplied value.
        found: ColumnType,
    },

    /// No column with this id is loaded.
    #[error("unknown column: {column_id}")]
    UnknownColumn {
        /// Column id that was looked up.
        column_id: String,
    },

    /// The backend failed a structural operation or a reload.
    #[error("{operation} failed: {source}")]
    Backend {
        /// Operation that was attempted.
        operation: &'static str,
        #[source]
        source: BackendError,
    },
}

impl StateError {
    pub(crate) fn backend(operation: &'static str, source: BackendError) -> Self {
        Self::Backend { operation, source }
    }

    /// Text for the transient user notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::ModeDenied { mode, .. } => {
                format!("This action is not available in {} mode.", mode.label())
            }
            Self::AccessDenied { .. } => {
                "You do not have permission to switch to this mode.".to_string()
            }
            Self::TypeMismatch { expected, .. } => {
                format!("This cell expects a {} value.", expected.label())
            }
            Self::UnknownColumn { .. } => "The column no longer exists.".to_string(),
            Self::Backend { source, .. } => source.user_message(),
        }
    }
}

/// Invalid transition attempted in the weekly schedule editor.
///
/// Scoped to one entry: the editor records it as the entry's fault and keeps
/// every other entry usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ScheduleError {
    /// No entry with this id on the given day.
    #[error("no entry '{entry_id}' on {day}")]
    UnknownEntry {
        /// Day that was searched.
        day: Weekday,
        /// Requested entry id.
        entry_id: String,
    },

    /// The action is not valid in the entry's current state.
    #[error("cannot {action} entry '{entry_id}' while it is {state:?}")]
    InvalidTransition {
        /// Entry the action targeted.
        entry_id: String,
        /// Attempted action ("confirm", "edit", "update").
        action: &'static str,
        /// State the entry was in.
        state: EntryState,
    },
}

impl ScheduleError {
    /// Entry the error is scoped to.
    pub fn entry_id(&self) -> &str {
        match self {
            Self::UnknownEntry { entry_id, .. } | Self::InvalidTransition { entry_id, .. } => {
                entry_id
            }
        }
    }
}

/// Result type alias for state operations.
pub type Result<T> = std::result::Result<T, StateError>;
