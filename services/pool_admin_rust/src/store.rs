//! JSON file store for the pool document.
//!
//! Reads and writes the whole document. There is no locking: concurrent
//! writers race and the last one to save wins.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use survivor_rust_core::PersistedData;
use tracing::{debug, info};

pub struct PoolStore {
    path: PathBuf,
}

impl PoolStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the document, seeding both contests when the file does not exist.
    pub fn load(&self, now: DateTime<Utc>) -> Result<PersistedData> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "No pool data yet, seeding rosters");
                return Ok(PersistedData::seeded(now));
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };
        let data = PersistedData::from_json(&raw)
            .with_context(|| format!("Malformed pool data in {}", self.path.display()))?;
        debug!(path = %self.path.display(), "Loaded pool data");
        Ok(data)
    }

    pub fn save(&self, data: &PersistedData) -> Result<()> {
        let json = data.to_json().context("Failed to serialize pool data")?;
        write_file(&self.path, &json)?;
        info!(path = %self.path.display(), "Saved pool data");
        Ok(())
    }
}

/// Pretty-print `value` to `path`, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
    write_file(path, &json)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
