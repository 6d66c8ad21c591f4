use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::api::rest::params;
use crate::engine::reservation::{end_reservation, start_reservation};
use crate::error::AppError;
use crate::geo::GeoPoint;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reservation/start", get(start).post(start))
        .route("/reservation/end", get(end).post(end))
}

#[derive(Deserialize)]
pub struct StartQuery {
    pub id: Option<String>,
}

#[derive(Deserialize)]
pub struct EndQuery {
    pub id: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
}

#[derive(Serialize)]
pub struct StartResponse {
    pub msg: String,
}

#[derive(Serialize)]
pub struct EndResponse {
    pub msg: String,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    pub amount: f64,
    pub currency: String,
    pub distance: f64,
}

async fn start(
    State(state): State<Arc<AppState>>,
    query: Result<Query<StartQuery>, QueryRejection>,
) -> Result<Json<StartResponse>, AppError> {
    let Query(query) = query?;
    let id = params::scooter_id(&query.id)?;
    let scooter = start_reservation(&state, id).await?;

    Ok(Json(StartResponse {
        msg: format!("Scooter {} was reserved successfully.", scooter.id),
    }))
}

async fn end(
    State(state): State<Arc<AppState>>,
    query: Result<Query<EndQuery>, QueryRejection>,
) -> Result<Json<EndResponse>, AppError> {
    let Query(query) = query?;
    let id = params::scooter_id(&query.id)?;
    let lat = params::required_f64("lat", &query.lat)?;
    let lng = params::required_f64("lng", &query.lng)?;
    let end = GeoPoint::new(lat, lng)?;

    let receipt = end_reservation(&state, id, end).await?;

    Ok(Json(EndResponse {
        msg: format!("Reservation for scooter {id} ended; payment accepted."),
        transaction_id: receipt.transaction_id,
        amount: receipt.amount,
        currency: receipt.currency,
        distance: receipt.distance_m,
    }))
}
