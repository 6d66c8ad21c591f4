use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use scooter_reservations::api::rest::router;
use scooter_reservations::config::Config;
use scooter_reservations::engine::payment::{PaymentDeclined, PaymentGateway};
use scooter_reservations::models::receipt::RideReceipt;
use scooter_reservations::models::scooter::Scooter;
use scooter_reservations::state::AppState;
use scooter_reservations::store::{MemoryStore, ScooterStore, StoreError};
use serde_json::{json, Value};
use tower::ServiceExt;

fn fleet() -> Vec<Scooter> {
    vec![
        Scooter::new("1", 10.0, 20.0, false),
        Scooter::new("2", 15.0, 25.0, true),
        Scooter::new("3", 12.0, 22.0, false),
    ]
}

fn setup_with(scooters: Vec<Scooter>) -> (axum::Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new(scooters));
    let state = AppState::new(Config::default(), store.clone());
    (router(Arc::new(state)), store)
}

fn setup() -> (axum::Router, Arc<MemoryStore>) {
    setup_with(fleet())
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn stored(store: &MemoryStore, id: &str) -> Scooter {
    store
        .load()
        .unwrap()
        .into_iter()
        .find(|scooter| scooter.id == id)
        .unwrap()
}

#[tokio::test]
async fn health_reports_fleet_counts() {
    let (app, _store) = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["scooters"], 3);
    assert_eq!(body["available"], 2);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let (app, _store) = setup();
    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("scooters_reserved"));
}

#[tokio::test]
async fn available_lists_only_unreserved_scooters() {
    let (app, _store) = setup();
    let response = app
        .oneshot(get_request("/scooters/available"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!([
            { "id": "1", "lat": 10.0, "lng": 20.0 },
            { "id": "3", "lat": 12.0, "lng": 22.0 }
        ])
    );
}

#[tokio::test]
async fn view_all_returns_storage_shape() {
    let (app, _store) = setup();
    let response = app.oneshot(get_request("/view_all")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[1], json!({ "id": "2", "lat": 15.0, "lng": 25.0, "is_reserved": true }));
}

#[tokio::test]
async fn search_at_scooter_location_returns_zero_distance() {
    let (app, _store) = setup_with(vec![Scooter::new("1", 10.0, 20.0, false)]);
    let response = app
        .oneshot(get_request("/search?lat=10&lng=20&radius=1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body,
        json!([{ "id": "1", "lat": 10.0, "lng": 20.0, "distance": 0.0 }])
    );
}

#[tokio::test]
async fn search_rejects_invalid_parameters_with_422() {
    let (app, _store) = setup();

    for uri in [
        "/search?lat=100&lng=20&radius=10",
        "/search?lat=10&lng=20&radius=-500",
        "/search?lat=10&lng=20",
        "/search?lat=ten&lng=20&radius=10",
        "/search?lat=10&lng=20&radius=20000",
    ] {
        let response = app.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        let body = body_json(response).await;
        assert!(body["msg"].as_str().unwrap().starts_with("invalid parameter"));
    }
}

#[tokio::test]
async fn nearby_uses_default_radius() {
    let (app, _store) = setup_with(vec![
        Scooter::new("near", 10.005, 20.0, false),
        Scooter::new("far", 10.02, 20.0, false),
    ]);
    let response = app
        .oneshot(get_request("/search/nearby?lat=10&lng=20"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], "near");
}

#[tokio::test]
async fn advanced_search_filters_sorts_and_truncates() {
    let (app, _store) = setup();
    let response = app
        .clone()
        .oneshot(get_request(
            "/search/advanced?lat=10&lng=20&radius=10000&include_reserved=false",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_found"], 1);
    assert_eq!(body["results"][0]["id"], "1");
    assert_eq!(body["results"][0]["is_reserved"], false);
    assert_eq!(body["search_criteria"]["sort_by"], "distance");

    let response = app
        .oneshot(get_request(
            "/search/advanced?lat=12&lng=22&radius=10000&include_reserved=true&sort_by=id&max_results=0",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total_found"], 1);
    assert_eq!(body["results"].as_array().unwrap().len(), 0);
    assert_eq!(body["search_criteria"]["include_reserved"], true);
}

#[tokio::test]
async fn advanced_search_rejects_bad_options() {
    let (app, _store) = setup();

    for uri in [
        "/search/advanced?lat=10&lng=20&radius=-1",
        "/search/advanced?lat=10&lng=20&max_results=many",
        "/search/advanced?lat=10&lng=20&sort_by=rating",
        "/search/advanced?lng=20",
    ] {
        let response = app.clone().oneshot(get_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
    }
}

#[tokio::test]
async fn start_then_search_excludes_reserved_scooter() {
    let (app, store) = setup();

    let response = app
        .clone()
        .oneshot(post_request("/reservation/start?id=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["msg"].as_str().unwrap().contains("reserved successfully"));
    assert!(stored(&store, "1").is_reserved);

    let response = app
        .oneshot(get_request("/search?lat=10&lng=20&radius=1"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn start_errors_are_422() {
    let (app, _store) = setup();

    for uri in [
        "/reservation/start",
        "/reservation/start?id=nonexistent",
        "/reservation/start?id=2",
    ] {
        let response = app.clone().oneshot(post_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
    }
}

#[tokio::test]
async fn unparseable_query_strings_are_422() {
    let (app, store) = setup();

    for request in [
        post_request("/reservation/start?id=1&id=2"),
        get_request("/reservation/end?id=2&lat=15&lat=16&lng=25"),
        get_request("/search?lat=10&lat=11&lng=20&radius=10"),
        get_request("/search/advanced?lat=10&lng=20&sort_by=id&sort_by=distance"),
    ] {
        let uri = request.uri().to_string();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        let body = body_json(response).await;
        assert!(body["msg"].as_str().unwrap().starts_with("invalid parameter"), "{uri}");
    }

    assert!(!stored(&store, "1").is_reserved);
    assert!(stored(&store, "2").is_reserved);
}

#[tokio::test]
async fn full_ride_flow_over_get() {
    let (app, store) = setup();

    let response = app
        .clone()
        .oneshot(get_request("/reservation/start?id=1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get_request("/reservation/end?id=1&lat=10.01&lng=20.01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["transactionId"].as_str().unwrap().starts_with("txn_"));
    assert_eq!(body["currency"], "USD");
    assert!(body["amount"].as_f64().unwrap() >= 1.0);
    assert!(body["distance"].as_f64().unwrap() > 1_000.0);

    assert_eq!(stored(&store, "1"), Scooter::new("1", 10.01, 20.01, false));

    let response = app
        .oneshot(get_request("/reservation/end?id=1&lat=10.02&lng=20.02"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(stored(&store, "1"), Scooter::new("1", 10.01, 20.01, false));
}

#[tokio::test]
async fn end_rejects_missing_or_out_of_range_params() {
    let (app, store) = setup();

    for uri in [
        "/reservation/end?id=2",
        "/reservation/end?id=2&lat=15",
        "/reservation/end?id=2&lat=95&lng=25",
        "/reservation/end?lat=15&lng=25",
    ] {
        let response = app.clone().oneshot(post_request(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
    }
    assert!(stored(&store, "2").is_reserved);
}

struct DecliningGateway;

impl PaymentGateway for DecliningGateway {
    fn charge(&self, _scooter_id: &str, _distance_m: f64) -> Result<RideReceipt, PaymentDeclined> {
        Err(PaymentDeclined {
            reason: "insufficient funds".to_string(),
        })
    }
}

#[tokio::test]
async fn declined_payment_returns_402_and_keeps_ride_open() {
    let store = Arc::new(MemoryStore::new(fleet()));
    let state = AppState::with_gateway(
        Config::default(),
        store.clone(),
        Arc::new(DecliningGateway),
    );
    let app = router(Arc::new(state));

    let response = app
        .oneshot(post_request("/reservation/end?id=2&lat=15.01&lng=25.01"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let body = body_json(response).await;
    assert!(body["msg"].as_str().unwrap().contains("insufficient funds"));
    assert_eq!(stored(&store, "2"), Scooter::new("2", 15.0, 25.0, true));
}

struct UnavailableStore;

impl ScooterStore for UnavailableStore {
    fn load(&self) -> Result<Vec<Scooter>, StoreError> {
        Err(StoreError::Corrupt("duplicate id 1".to_string()))
    }

    fn save(&self, _scooters: &[Scooter]) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("disk full")))
    }
}

#[tokio::test]
async fn unavailable_store_surfaces_as_500() {
    let state = AppState::new(Config::default(), Arc::new(UnavailableStore));
    let app = router(Arc::new(state));

    for request in [
        get_request("/scooters/available"),
        get_request("/search?lat=10&lng=20&radius=100"),
        post_request("/reservation/start?id=1"),
    ] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["msg"].as_str().unwrap().starts_with("storage unavailable"));
    }
}
