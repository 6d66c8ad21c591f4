use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already reserved: {0}")]
    AlreadyReserved(String),

    #[error("not reserved: {0}")]
    NotReserved(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("payment failed: {0}")]
    PaymentFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::StorageUnavailable(err.to_string())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidParameter(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidParameter(_)
            | AppError::NotFound(_)
            | AppError::AlreadyReserved(_)
            | AppError::NotReserved(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::PaymentFailed(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::StorageUnavailable(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "msg": self.to_string()
        }));

        (status, body).into_response()
    }
}
