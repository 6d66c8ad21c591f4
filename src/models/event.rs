use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationEventKind {
    Started,
    Ended,
    PaymentDeclined,
}

/// Published on every lifecycle transition and every declined payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationEvent {
    pub scooter_id: String,
    pub kind: ReservationEventKind,
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub at: DateTime<Utc>,
}
