//! Error types for the model crate and the backend boundary.

use thiserror::Error;

/// Failure reported by the hosted table service.
///
/// Every data operation in Tabula is a request against the backend; this enum
/// is what those requests fail with. The state layer turns these into user
/// notifications and, for cell edits, a rollback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BackendError {
    /// The request never reached the service or the response was lost.
    #[error("network error during {operation}: {message}")]
    Network {
        /// Backend operation that failed (e.g. "upsert_cell").
        operation: &'static str,
        /// Transport-level description.
        message: String,
    },

    /// The service refused the request (policy, constraint or validation).
    #[error("{operation} rejected: {message}")]
    Rejected {
        /// Backend operation that failed.
        operation: &'static str,
        /// Reason given by the service.
        message: String,
    },

    /// A referenced row, column or table does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of entity ("column", "table").
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// The storage layer behind the service failed.
    #[error("storage error: {0}")]
    Storage(String),
}

impl BackendError {
    /// Short text suitable for a transient notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network { .. } => {
                "The server could not be reached. Please check your connection.".to_string()
            }
            Self::Rejected { message, .. } => format!("The change was rejected: {message}"),
            Self::NotFound { entity, .. } => format!("The {entity} no longer exists."),
            Self::Storage(_) => "The change could not be stored.".to_string(),
        }
    }
}

/// Returned when a column type name is not one of the known types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown column type: {0}")]
pub struct ParseColumnTypeError(pub String);
