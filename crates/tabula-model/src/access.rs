//! Table modes and access levels.
//!
//! These gate what the UI offers; the backend's row-level policies remain
//! the real authority.

use serde::{Deserialize, Serialize};

/// Interaction mode of the table view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableMode {
    /// Read-only.
    #[default]
    View,
    /// Cell values may change.
    Edit,
    /// Rows and columns may change as well.
    Structure,
}

impl TableMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::View => "Ansicht",
            Self::Edit => "Bearbeitung",
            Self::Structure => "Struktur",
        }
    }

    #[inline]
    pub fn allows_cell_edits(&self) -> bool {
        matches!(self, Self::Edit | Self::Structure)
    }

    #[inline]
    pub fn allows_structure_changes(&self) -> bool {
        matches!(self, Self::Structure)
    }
}

/// What the current user may do with a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    Viewer,
    Editor,
    Owner,
}

impl AccessLevel {
    /// Whether this access level may switch the view into `mode`.
    pub fn allows(&self, mode: TableMode) -> bool {
        match self {
            Self::Viewer => mode == TableMode::View,
            Self::Editor => mode != TableMode::Structure,
            Self::Owner => true,
        }
    }

    /// Modes offered to this access level.
    pub fn modes(&self) -> Vec<TableMode> {
        [TableMode::View, TableMode::Edit, TableMode::Structure]
            .into_iter()
            .filter(|mode| self.allows(*mode))
            .collect()
    }
}
