use std::env;

use crate::engine::payment::Tariff;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub log_format: LogFormat,
    pub store_path: String,
    pub tariff: Tariff,
    pub max_search_radius: f64,
    pub default_search_radius: f64,
    pub event_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 8080,
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            store_path: "scooter_db.json".to_string(),
            tariff: Tariff::default(),
            max_search_radius: 10_000.0,
            default_search_radius: 1_000.0,
            event_buffer_size: 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        let log_format = match env::var("LOG_FORMAT") {
            Ok(raw) if raw.eq_ignore_ascii_case("json") => LogFormat::Json,
            Ok(raw) if raw.eq_ignore_ascii_case("compact") => LogFormat::Compact,
            Ok(raw) => {
                return Err(AppError::Internal(format!("invalid LOG_FORMAT: {raw}")));
            }
            Err(_) => defaults.log_format,
        };

        let config = Self {
            http_port: parse_or_default("HTTP_PORT", defaults.http_port)?,
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format,
            store_path: env::var("STORE_PATH").unwrap_or(defaults.store_path),
            tariff: Tariff {
                cost_per_meter: parse_or_default("COST_PER_METER", defaults.tariff.cost_per_meter)?,
                minimum_charge: parse_or_default("MINIMUM_CHARGE", defaults.tariff.minimum_charge)?,
                currency: env::var("CURRENCY").unwrap_or(defaults.tariff.currency),
            },
            max_search_radius: parse_or_default("MAX_SEARCH_RADIUS", defaults.max_search_radius)?,
            default_search_radius: parse_or_default(
                "DEFAULT_SEARCH_RADIUS",
                defaults.default_search_radius,
            )?,
            event_buffer_size: parse_or_default("EVENT_BUFFER_SIZE", defaults.event_buffer_size)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let non_negative = |key: &str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(AppError::Internal(format!("invalid {key}: must be >= 0, got {value}")))
            }
        };

        non_negative("COST_PER_METER", self.tariff.cost_per_meter)?;
        non_negative("MINIMUM_CHARGE", self.tariff.minimum_charge)?;
        non_negative("MAX_SEARCH_RADIUS", self.max_search_radius)?;
        non_negative("DEFAULT_SEARCH_RADIUS", self.default_search_radius)?;

        if self.default_search_radius > self.max_search_radius {
            return Err(AppError::Internal(format!(
                "invalid DEFAULT_SEARCH_RADIUS: {} exceeds MAX_SEARCH_RADIUS {}",
                self.default_search_radius, self.max_search_radius
            )));
        }

        if self.event_buffer_size == 0 {
            return Err(AppError::Internal(
                "invalid EVENT_BUFFER_SIZE: must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
