use chrono::Utc;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::geo::{haversine_m, GeoPoint};
use crate::models::event::{ReservationEvent, ReservationEventKind};
use crate::models::receipt::RideReceipt;
use crate::models::scooter::Scooter;
use crate::state::AppState;

/// Reserves an available scooter.
pub async fn start_reservation(state: &AppState, scooter_id: &str) -> Result<Scooter, AppError> {
    let result = start_locked(state, scooter_id).await;
    record_outcome(state, "start", &result);

    let scooter = result?;
    info!(scooter_id = %scooter.id, "reservation started");
    publish(state, &scooter, ReservationEventKind::Started, None, None);

    Ok(scooter)
}

/// Ends an open reservation at `end`, charging for the distance ridden.
///
/// A declined payment leaves the scooter reserved at its old location so the
/// rider can retry.
pub async fn end_reservation(
    state: &AppState,
    scooter_id: &str,
    end: GeoPoint,
) -> Result<RideReceipt, AppError> {
    let result = end_locked(state, scooter_id, end).await;
    record_outcome(state, "end", &result);

    let (scooter, receipt) = result?;
    info!(
        scooter_id = %scooter.id,
        transaction_id = %receipt.transaction_id,
        distance_m = receipt.distance_m,
        amount = receipt.amount,
        "reservation ended"
    );
    publish(
        state,
        &scooter,
        ReservationEventKind::Ended,
        Some(receipt.transaction_id.clone()),
        None,
    );

    Ok(receipt)
}

async fn start_locked(state: &AppState, scooter_id: &str) -> Result<Scooter, AppError> {
    let _guard = state.store_lock.write().await;
    let mut scooters = state.load_scooters().await?;

    let scooter = find_mut(&mut scooters, scooter_id)?;
    if scooter.is_reserved {
        warn!(scooter_id, "start rejected: scooter already reserved");
        return Err(AppError::AlreadyReserved(format!(
            "scooter {scooter_id} is already reserved"
        )));
    }

    scooter.is_reserved = true;
    let reserved = scooter.clone();

    save(state, scooters).await?;
    Ok(reserved)
}

async fn end_locked(
    state: &AppState,
    scooter_id: &str,
    end: GeoPoint,
) -> Result<(Scooter, RideReceipt), AppError> {
    let end = GeoPoint::new(end.lat, end.lng)?;

    let _guard = state.store_lock.write().await;
    let mut scooters = state.load_scooters().await?;

    let scooter = find_mut(&mut scooters, scooter_id)?;
    if !scooter.is_reserved {
        warn!(scooter_id, "end rejected: scooter is not reserved");
        return Err(AppError::NotReserved(format!(
            "scooter {scooter_id} is not reserved"
        )));
    }

    let distance_m = haversine_m(&scooter.location(), &end);
    state.metrics.ride_distance_meters.observe(distance_m);

    let receipt = match state.gateway.charge(scooter_id, distance_m) {
        Ok(receipt) => receipt,
        Err(declined) => {
            state
                .metrics
                .payments_total
                .with_label_values(&["declined"])
                .inc();
            warn!(scooter_id, reason = %declined, "payment declined; reservation stays open");
            publish(
                state,
                scooter,
                ReservationEventKind::PaymentDeclined,
                None,
                Some(declined.reason.clone()),
            );
            return Err(AppError::PaymentFailed(declined.reason));
        }
    };
    state
        .metrics
        .payments_total
        .with_label_values(&["approved"])
        .inc();

    scooter.is_reserved = false;
    scooter.lat = end.lat;
    scooter.lng = end.lng;
    let returned = scooter.clone();

    if let Err(err) = save(state, scooters).await {
        error!(
            scooter_id,
            transaction_id = %receipt.transaction_id,
            amount = receipt.amount,
            error = %err,
            "ride charged but could not be recorded"
        );
        return Err(AppError::StorageUnavailable(format!(
            "charge {} succeeded but the ride could not be recorded: {err}",
            receipt.transaction_id
        )));
    }
    Ok((returned, receipt))
}

fn find_mut<'a>(scooters: &'a mut [Scooter], scooter_id: &str) -> Result<&'a mut Scooter, AppError> {
    match scooters.iter_mut().find(|scooter| scooter.id == scooter_id) {
        Some(scooter) => Ok(scooter),
        None => {
            warn!(scooter_id, "no scooter with this id");
            Err(AppError::NotFound(format!("no scooter with id {scooter_id} was found")))
        }
    }
}

async fn save(state: &AppState, scooters: Vec<Scooter>) -> Result<(), AppError> {
    let reserved = scooters.iter().filter(|scooter| scooter.is_reserved).count();
    state.save_scooters(scooters).await?;

    state.metrics.scooters_reserved.set(reserved as i64);
    Ok(())
}

fn record_outcome<T>(state: &AppState, operation: &str, result: &Result<T, AppError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(AppError::InvalidParameter(_)) => "invalid",
        Err(AppError::NotFound(_)) => "not_found",
        Err(AppError::AlreadyReserved(_)) | Err(AppError::NotReserved(_)) => "conflict",
        Err(AppError::PaymentFailed(_)) => "payment_failed",
        Err(AppError::StorageUnavailable(_)) | Err(AppError::Internal(_)) => "error",
    };

    state
        .metrics
        .reservations_total
        .with_label_values(&[operation, outcome])
        .inc();
}

fn publish(
    state: &AppState,
    scooter: &Scooter,
    kind: ReservationEventKind,
    transaction_id: Option<String>,
    reason: Option<String>,
) {
    let event = ReservationEvent {
        scooter_id: scooter.id.clone(),
        kind,
        lat: scooter.lat,
        lng: scooter.lng,
        transaction_id,
        reason,
        at: Utc::now(),
    };
    let _ = state.reservation_events_tx.send(event);
}
