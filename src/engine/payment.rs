use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::receipt::RideReceipt;

/// Ride pricing: a per-meter rate with a minimum charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tariff {
    pub cost_per_meter: f64,
    pub minimum_charge: f64,
    pub currency: String,
}

impl Default for Tariff {
    fn default() -> Self {
        Self {
            cost_per_meter: 0.01,
            minimum_charge: 1.00,
            currency: "USD".to_string(),
        }
    }
}

impl Tariff {
    /// Price of a ride, rounded to cents. Monotonic in distance and never below
    /// the minimum charge.
    pub fn price(&self, distance_m: f64) -> f64 {
        let metered = distance_m.max(0.0) * self.cost_per_meter;
        let amount = metered.max(self.minimum_charge);
        (amount * 100.0).round() / 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{reason}")]
pub struct PaymentDeclined {
    pub reason: String,
}

/// Charges a rider for a completed ride.
pub trait PaymentGateway: Send + Sync {
    fn charge(&self, scooter_id: &str, distance_m: f64) -> Result<RideReceipt, PaymentDeclined>;
}

/// Gateway stand-in that approves every well-formed charge.
#[derive(Debug, Clone, Default)]
pub struct MockGateway {
    tariff: Tariff,
}

impl MockGateway {
    pub fn new(tariff: Tariff) -> Self {
        Self { tariff }
    }
}

impl PaymentGateway for MockGateway {
    fn charge(&self, scooter_id: &str, distance_m: f64) -> Result<RideReceipt, PaymentDeclined> {
        if !distance_m.is_finite() || distance_m < 0.0 {
            return Err(PaymentDeclined {
                reason: format!("invalid ride distance {distance_m}"),
            });
        }

        let amount = self.tariff.price(distance_m);
        if !amount.is_finite() {
            return Err(PaymentDeclined {
                reason: format!("amount for {distance_m} m is not chargeable"),
            });
        }

        Ok(RideReceipt {
            transaction_id: format!("txn_{}", Uuid::new_v4().simple()),
            scooter_id: scooter_id.to_string(),
            distance_m,
            amount,
            currency: self.tariff.currency.clone(),
            charged_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{MockGateway, PaymentGateway, Tariff};

    #[test]
    fn short_rides_pay_the_minimum_charge() {
        let tariff = Tariff::default();
        assert_eq!(tariff.price(0.0), 1.00);
        assert_eq!(tariff.price(50.0), 1.00);
    }

    #[test]
    fn long_rides_are_metered() {
        let tariff = Tariff::default();
        assert_eq!(tariff.price(1_550.0), 15.50);
    }

    #[test]
    fn price_is_monotonic_in_distance() {
        let tariff = Tariff {
            cost_per_meter: 0.0037,
            minimum_charge: 0.5,
            currency: "EUR".to_string(),
        };
        let mut previous = 0.0;
        for step in 0..200 {
            let price = tariff.price(step as f64 * 25.0);
            assert!(price >= previous);
            previous = price;
        }
    }

    #[test]
    fn mock_gateway_approves_valid_distance() {
        let gateway = MockGateway::new(Tariff::default());
        let receipt = gateway.charge("1", 1_200.0).unwrap();

        assert!(receipt.transaction_id.starts_with("txn_"));
        assert_eq!(receipt.scooter_id, "1");
        assert_eq!(receipt.amount, 12.0);
        assert_eq!(receipt.currency, "USD");
    }

    #[test]
    fn mock_gateway_declines_nonsense_distance() {
        let gateway = MockGateway::default();
        assert!(gateway.charge("1", f64::NAN).is_err());
        assert!(gateway.charge("1", -3.0).is_err());
    }
}
