use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use axum::Router;

use crate::error::AppError;
use crate::models::scooter::{AvailableScooter, Scooter};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/scooters/available", get(list_available))
        .route("/view_all", get(view_all))
}

async fn list_available(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AvailableScooter>>, AppError> {
    let scooters = state.snapshot().await?;
    let available = scooters
        .iter()
        .filter(|scooter| scooter.is_available())
        .map(AvailableScooter::from)
        .collect();

    Ok(Json(available))
}

async fn view_all(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Scooter>>, AppError> {
    Ok(Json(state.snapshot().await?))
}
