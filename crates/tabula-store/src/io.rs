//! Loading and saving table files.
//!
//! Table files are pretty-printed JSON. Saves write a sibling temp file and
//! rename it over the target, so a crash never leaves a half-written file.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::tables::{CURRENT_VERSION, TableSet};

/// Load a table file.
pub fn load_tables(path: &Path) -> Result<TableSet> {
    let bytes = fs::read(path).map_err(|e| StoreError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source: e,
    })?;
    let set: TableSet =
        serde_json::from_slice(&bytes).map_err(|e| StoreError::InvalidFormat {
            path: path.to_path_buf(),
            source: e,
        })?;
    if set.version > CURRENT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: set.version,
            max_supported: CURRENT_VERSION,
            path: path.to_path_buf(),
        });
    }
    tracing::debug!(
        path = %path.display(),
        tables = set.tables.len(),
        records = set.records.len(),
        "Loaded table file"
    );
    Ok(set)
}

/// Load a table file, or start an empty set if it does not exist yet.
pub fn load_or_default(path: &Path) -> Result<TableSet> {
    if path.exists() {
        load_tables(path)
    } else {
        Ok(TableSet::new())
    }
}

/// Save a table file atomically.
pub fn save_tables(set: &TableSet, path: &Path) -> Result<()> {
    let bytes =
        serde_json::to_vec_pretty(set).map_err(|e| StoreError::Serialization { source: e })?;

    let temp_path = path.with_extension("json.tmp");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut file = File::create(&temp_path).map_err(|e| StoreError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;
    file.write_all(&bytes).map_err(|e| StoreError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;
    file.sync_all().map_err(|e| StoreError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| StoreError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Saved table file");
    Ok(())
}

/// Save on the blocking pool and hand the set back.
pub async fn save_tables_async(set: TableSet, path: PathBuf) -> Result<TableSet> {
    tokio::task::spawn_blocking(move || save_tables(&set, &path).map(|()| set))
        .await
        .map_err(|e| StoreError::Task { source: e })?
}
