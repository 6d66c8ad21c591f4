use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// A rentable scooter as persisted in the store document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scooter {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub is_reserved: bool,
}

impl Scooter {
    pub fn new(id: impl Into<String>, lat: f64, lng: f64, is_reserved: bool) -> Self {
        Self {
            id: id.into(),
            lat,
            lng,
            is_reserved,
        }
    }

    pub fn location(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lng: self.lng,
        }
    }

    pub fn is_available(&self) -> bool {
        !self.is_reserved
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailableScooter {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
}

impl From<&Scooter> for AvailableScooter {
    fn from(scooter: &Scooter) -> Self {
        Self {
            id: scooter.id.clone(),
            lat: scooter.lat,
            lng: scooter.lng,
        }
    }
}
