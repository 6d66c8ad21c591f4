//! Store backed by a single JSON document on disk.
//!
//! Saves go through a sibling `{path}.tmp` file that is synced and then
//! renamed over the document, so readers only ever see a complete version.
//!
//! Coordinates are `f64`, so a document written with integer literals
//! (`"lat": 10`) comes back as `10.0`. Saving a loaded document preserves
//! every value numerically, not textually.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::models::scooter::Scooter;
use crate::store::{check_integrity, ScooterStore, StoreError};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl ScooterStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Scooter>, StoreError> {
        let bytes = fs::read(&self.path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => StoreError::Missing {
                path: self.path.display().to_string(),
            },
            _ => StoreError::Io(err),
        })?;

        let scooters: Vec<Scooter> = serde_json::from_slice(&bytes)?;
        check_integrity(&scooters)?;

        debug!(path = %self.path.display(), scooters = scooters.len(), "store loaded");
        Ok(scooters)
    }

    fn save(&self, scooters: &[Scooter]) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(scooters)?;
        let tmp_path = self.tmp_path();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = File::create(&tmp_path)?;
        file.write_all(&data)?;
        file.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;

        debug!(path = %self.path.display(), scooters = scooters.len(), "store saved");
        Ok(())
    }
}
