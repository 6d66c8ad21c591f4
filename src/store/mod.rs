pub mod json_file;
pub mod memory;

use std::collections::HashSet;

use thiserror::Error;

use crate::models::scooter::Scooter;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store document {path} is missing")]
    Missing { path: String },

    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("store document is corrupt: {0}")]
    Corrupt(String),
}

/// Persistence for the full scooter collection.
///
/// `load` returns the whole document and `save` replaces it. Implementations
/// must never expose a partially written document to a concurrent `load`.
pub trait ScooterStore: Send + Sync {
    fn load(&self) -> Result<Vec<Scooter>, StoreError>;
    fn save(&self, scooters: &[Scooter]) -> Result<(), StoreError>;
}

/// Rejects documents that break the collection invariants.
pub fn check_integrity(scooters: &[Scooter]) -> Result<(), StoreError> {
    let mut seen = HashSet::with_capacity(scooters.len());

    for scooter in scooters {
        if !seen.insert(scooter.id.as_str()) {
            return Err(StoreError::Corrupt(format!("duplicate id {}", scooter.id)));
        }
        if !scooter.location().is_valid() {
            return Err(StoreError::Corrupt(format!(
                "scooter {} has invalid coordinates ({}, {})",
                scooter.id, scooter.lat, scooter.lng
            )));
        }
    }

    Ok(())
}
