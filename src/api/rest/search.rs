use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::api::rest::params;
use crate::engine::search::{self, DetailedHit, SearchHit, SearchOptions, SortBy};
use crate::error::AppError;
use crate::geo::GeoPoint;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search", get(search_scooters))
        .route("/search/nearby", get(search_nearby))
        .route("/search/advanced", get(search_advanced))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
}

#[derive(Deserialize)]
pub struct AdvancedSearchQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub radius: Option<String>,
    pub max_results: Option<String>,
    pub sort_by: Option<String>,
    pub include_reserved: Option<String>,
}

#[derive(Serialize)]
pub struct SearchCriteria {
    pub lat: f64,
    pub lng: f64,
    pub radius: f64,
    pub sort_by: SortBy,
    pub include_reserved: bool,
}

#[derive(Serialize)]
pub struct AdvancedSearchResponse {
    pub results: Vec<DetailedHit>,
    pub total_found: usize,
    pub search_criteria: SearchCriteria,
}

fn origin(lat: &Option<String>, lng: &Option<String>) -> Result<GeoPoint, AppError> {
    let lat = params::required_f64("lat", lat)?;
    let lng = params::required_f64("lng", lng)?;
    GeoPoint::new(lat, lng)
}

async fn search_scooters(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    let Query(query) = query?;
    let origin = origin(&query.lat, &query.lng)?;
    let radius = params::required_f64("radius", &query.radius)?;
    let radius = search::validate_radius(radius, state.config.max_search_radius)?;

    let scooters = state.snapshot().await?;
    Ok(Json(search::find(origin, radius, &scooters)?))
}

async fn search_nearby(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<Json<Vec<SearchHit>>, AppError> {
    let Query(query) = query?;
    let origin = origin(&query.lat, &query.lng)?;

    let scooters = state.snapshot().await?;
    Ok(Json(search::find(
        origin,
        state.config.default_search_radius,
        &scooters,
    )?))
}

async fn search_advanced(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AdvancedSearchQuery>, QueryRejection>,
) -> Result<Json<AdvancedSearchResponse>, AppError> {
    let Query(query) = query?;
    let origin = origin(&query.lat, &query.lng)?;
    let radius = params::optional::<f64>("radius", &query.radius)?
        .unwrap_or(state.config.default_search_radius);
    let radius = search::validate_radius(radius, state.config.max_search_radius)?;

    let options = SearchOptions {
        sort_by: params::optional::<String>("sort_by", &query.sort_by)?
            .map(|raw| raw.parse::<SortBy>())
            .transpose()?
            .unwrap_or_default(),
        include_reserved: params::optional::<bool>("include_reserved", &query.include_reserved)?
            .unwrap_or(false),
        max_results: params::optional::<usize>("max_results", &query.max_results)?,
    };

    let scooters = state.snapshot().await?;
    let outcome = search::search(origin, radius, &scooters, &options)?;

    Ok(Json(AdvancedSearchResponse {
        results: outcome.hits,
        total_found: outcome.total_found,
        search_criteria: SearchCriteria {
            lat: origin.lat,
            lng: origin.lng,
            radius,
            sort_by: options.sort_by,
            include_reserved: options.include_reserved,
        },
    }))
}
