use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Proof of a successful charge for a completed ride.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideReceipt {
    pub transaction_id: String,
    pub scooter_id: String,
    pub distance_m: f64,
    pub amount: f64,
    pub currency: String,
    pub charged_at: DateTime<Utc>,
}
