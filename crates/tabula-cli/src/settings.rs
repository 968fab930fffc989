//! User settings stored as TOML in the platform config folder.
//!
//! - macOS: ~/Library/Application Support/org.tabula.Tabula/settings.toml
//! - Windows: %APPDATA%\tabula\Tabula\config\settings.toml
//! - Linux: ~/.config/tabula/settings.toml

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tabula_model::Identity;
use tabula_state::GridConfig;

use crate::logging::{LogFormat, LogLevel};

const APP_QUALIFIER: &str = "org";
const APP_ORG: &str = "tabula";
const APP_NAME: &str = "Tabula";
const CONFIG_FILENAME: &str = "settings.toml";

/// Table file used when neither `--file` nor the settings name one.
pub const DEFAULT_TABLE_FILE: &str = "tabula.json";

/// All persisted settings. Missing sections and keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grid: GridSettings,
    pub logging: LoggingSettings,
    pub identity: IdentitySettings,
    pub store: StoreSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Rows shown even when a table has fewer.
    pub min_rows: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            min_rows: GridConfig::DEFAULT_MIN_ROWS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level used when neither `--log-level` nor `-v`/`-q` is given.
    pub level: Option<LogLevel>,
    pub format: LogFormat,
}

/// The acting user recorded on schedule entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySettings {
    pub username: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub file: Option<PathBuf>,
    /// Table id or name used when `--table` is omitted.
    pub default_table: Option<String>,
}

impl Settings {
    pub fn grid_config(&self) -> GridConfig {
        GridConfig::default().with_min_rows(self.grid.min_rows)
    }

    /// Identity for attribution, if a username is configured.
    pub fn identity(&self) -> Option<Identity> {
        let username = self.identity.username.as_deref()?.trim();
        if username.is_empty() {
            return None;
        }
        Some(Identity::new(
            username,
            self.identity.display_name.clone().unwrap_or_default(),
        ))
    }
}

/// Platform path of the settings file, if the platform has one.
pub fn settings_path() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}

/// Read settings from `path`. A missing file yields the defaults.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read or parsed.
pub fn load_from(path: &Path) -> Result<Settings> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("read settings {}", path.display()));
        }
    };
    toml::from_str(&content).with_context(|| format!("parse settings {}", path.display()))
}

/// Write settings to `path`, creating its parent directory.
pub fn save_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create config directory {}", parent.display()))?;
    }
    let content = toml::to_string_pretty(settings).context("serialize settings")?;
    fs::write(path, content).with_context(|| format!("write settings {}", path.display()))?;
    tracing::info!(path = %path.display(), "Saved settings");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let settings = load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.grid.min_rows, 5);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            "[identity]\nusername = \"jdoe\"\ndisplay_name = \"Jane Doe\"\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let settings = load_from(&path).unwrap();
        assert_eq!(settings.grid.min_rows, 5);
        assert_eq!(settings.logging.level, Some(LogLevel::Debug));
        assert_eq!(settings.logging.format, LogFormat::Pretty);
        assert_eq!(settings.identity().unwrap().attribution(), "Jane Doe");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[grid]\nmin_rows = \"many\"\n").unwrap();
        assert!(load_from(&path).is_err());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let mut settings = Settings::default();
        settings.grid.min_rows = 12;
        settings.store.default_table = Some("Plan".into());

        save_to(&settings, &path).unwrap();
        assert_eq!(load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_blank_username_has_no_identity() {
        let mut settings = Settings::default();
        settings.identity.username = Some("  ".into());
        assert!(settings.identity().is_none());
    }
}
