//! Users as seen by the table core.

use serde::{Deserialize, Serialize};

/// The acting user, passed explicitly to anything that stamps edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    #[serde(default)]
    pub display_name: String,
}

impl Identity {
    pub fn new(username: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            display_name: display_name.into(),
        }
    }

    /// Name recorded in `lastEditedBy`: the display name, or the username
    /// when no display name is set.
    pub fn attribution(&self) -> &str {
        let display = self.display_name.trim();
        if display.is_empty() {
            self.username.as_str()
        } else {
            display
        }
    }
}

/// Entry of the user directory backing `user_dropdown` columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}
