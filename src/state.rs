use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::config::Config;
use crate::engine::payment::{MockGateway, PaymentGateway};
use crate::error::AppError;
use crate::models::event::ReservationEvent;
use crate::models::scooter::Scooter;
use crate::observability::metrics::Metrics;
use crate::store::ScooterStore;

pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn ScooterStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    /// Serializes load-mutate-save cycles against each other and against
    /// snapshot reads.
    pub store_lock: RwLock<()>,
    pub reservation_events_tx: broadcast::Sender<ReservationEvent>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ScooterStore>) -> Self {
        let gateway = Arc::new(MockGateway::new(config.tariff.clone()));
        Self::with_gateway(config, store, gateway)
    }

    pub fn with_gateway(
        config: Config,
        store: Arc<dyn ScooterStore>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let (reservation_events_tx, _unused_rx) = broadcast::channel(config.event_buffer_size);

        Self {
            config,
            store,
            gateway,
            store_lock: RwLock::new(()),
            reservation_events_tx,
            metrics: Metrics::new(),
        }
    }

    /// Freshly loaded copy of every scooter.
    pub async fn snapshot(&self) -> Result<Vec<Scooter>, AppError> {
        let _guard = self.store_lock.read().await;
        self.load_scooters().await
    }

    /// Loads the store on the blocking pool. Callers hold `store_lock`.
    pub(crate) async fn load_scooters(&self) -> Result<Vec<Scooter>, AppError> {
        let store = self.store.clone();
        let loaded = tokio::task::spawn_blocking(move || store.load())
            .await
            .map_err(|err| AppError::Internal(format!("store load task failed: {err}")))?;

        loaded.map_err(|err| {
            tracing::error!(error = %err, "failed to load scooter store");
            AppError::from(err)
        })
    }

    /// Saves the store on the blocking pool. Callers hold the `store_lock` write guard.
    pub(crate) async fn save_scooters(&self, scooters: Vec<Scooter>) -> Result<(), AppError> {
        let store = self.store.clone();
        let saved = tokio::task::spawn_blocking(move || store.save(&scooters))
            .await
            .map_err(|err| AppError::Internal(format!("store save task failed: {err}")))?;

        saved.map_err(|err| {
            tracing::error!(error = %err, "failed to save scooter store");
            AppError::from(err)
        })
    }
}
