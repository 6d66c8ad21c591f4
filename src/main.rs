use std::sync::Arc;

use scooter_reservations::api;
use scooter_reservations::config::{Config, LogFormat};
use scooter_reservations::error::AppError;
use scooter_reservations::state::AppState;
use scooter_reservations::store::{JsonFileStore, ScooterStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = Config::from_env()?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.log_level.clone()))
        .with_target(false);
    match config.log_format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Compact => subscriber.compact().init(),
    }

    let store = JsonFileStore::new(&config.store_path);
    match store.load() {
        Ok(scooters) => tracing::info!(
            path = %config.store_path,
            scooters = scooters.len(),
            "scooter store opened"
        ),
        Err(err) => tracing::warn!(
            path = %config.store_path,
            error = %err,
            "scooter store not readable; requests will fail until it is"
        ),
    }

    let http_port = config.http_port;
    let shared_state = Arc::new(AppState::new(config, Arc::new(store)));
    let app = api::rest::router(shared_state);

    let bind_addr = format!("0.0.0.0:{http_port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| AppError::Internal(format!("failed to bind {bind_addr}: {err}")))?;

    tracing::info!(http_port, "http server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::Internal(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
