use std::cmp::Ordering;
use std::str::FromStr;

use serde::Serialize;

use crate::error::AppError;
use crate::geo::{haversine_m, GeoPoint};
use crate::models::scooter::Scooter;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DetailedHit {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
    pub is_reserved: bool,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Distance,
    Id,
}

impl FromStr for SortBy {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "distance" => Ok(SortBy::Distance),
            "id" => Ok(SortBy::Id),
            other => Err(AppError::InvalidParameter(format!(
                "sort_by must be 'distance' or 'id', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub sort_by: SortBy,
    pub include_reserved: bool,
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub hits: Vec<DetailedHit>,
    pub total_found: usize,
}

/// Rejects negative, non-finite, or over-limit radii.
pub fn validate_radius(radius_m: f64, max_radius_m: f64) -> Result<f64, AppError> {
    if !radius_m.is_finite() || radius_m < 0.0 {
        return Err(AppError::InvalidParameter(format!(
            "radius must be a non-negative number of meters, got {radius_m}"
        )));
    }
    if radius_m > max_radius_m {
        return Err(AppError::InvalidParameter(format!(
            "radius {radius_m} exceeds the maximum of {max_radius_m} meters"
        )));
    }

    Ok(radius_m)
}

/// Available scooters within `radius_m` of `origin`, nearest first with ties
/// broken by id.
pub fn find(origin: GeoPoint, radius_m: f64, scooters: &[Scooter]) -> Result<Vec<SearchHit>, AppError> {
    let outcome = search(origin, radius_m, scooters, &SearchOptions::default())?;

    Ok(outcome
        .hits
        .into_iter()
        .map(|hit| SearchHit {
            id: hit.id,
            lat: hit.lat,
            lng: hit.lng,
            distance: hit.distance,
        })
        .collect())
}

pub fn search(
    origin: GeoPoint,
    radius_m: f64,
    scooters: &[Scooter],
    options: &SearchOptions,
) -> Result<SearchOutcome, AppError> {
    let origin = GeoPoint::new(origin.lat, origin.lng)?;
    let radius_m = validate_radius(radius_m, f64::INFINITY)?;

    let mut hits: Vec<DetailedHit> = scooters
        .iter()
        .filter(|scooter| options.include_reserved || scooter.is_available())
        .filter_map(|scooter| {
            let distance = haversine_m(&origin, &scooter.location());
            (distance <= radius_m).then(|| DetailedHit {
                id: scooter.id.clone(),
                lat: scooter.lat,
                lng: scooter.lng,
                is_reserved: scooter.is_reserved,
                distance,
            })
        })
        .collect();

    hits.sort_by(|a, b| compare_hits(a, b, options.sort_by));

    let total_found = hits.len();
    if let Some(limit) = options.max_results {
        hits.truncate(limit);
    }

    Ok(SearchOutcome { hits, total_found })
}

fn compare_hits(a: &DetailedHit, b: &DetailedHit, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::Distance => a
            .distance
            .total_cmp(&b.distance)
            .then_with(|| a.id.cmp(&b.id)),
        SortBy::Id => a.id.cmp(&b.id).then_with(|| a.distance.total_cmp(&b.distance)),
    }
}
