use std::sync::{Mutex, PoisonError};

use crate::models::scooter::Scooter;
use crate::store::{ScooterStore, StoreError};

/// In-process store, used by tests and for running without a document.
#[derive(Debug, Default)]
pub struct MemoryStore {
    scooters: Mutex<Vec<Scooter>>,
}

impl MemoryStore {
    pub fn new(scooters: Vec<Scooter>) -> Self {
        Self {
            scooters: Mutex::new(scooters),
        }
    }
}

impl ScooterStore for MemoryStore {
    fn load(&self) -> Result<Vec<Scooter>, StoreError> {
        let guard = self.scooters.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.clone())
    }

    fn save(&self, scooters: &[Scooter]) -> Result<(), StoreError> {
        let mut guard = self.scooters.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = scooters.to_vec();
        Ok(())
    }
}
