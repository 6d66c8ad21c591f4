use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub reservations_total: IntCounterVec,
    pub payments_total: IntCounterVec,
    pub ride_distance_meters: Histogram,
    pub scooters_reserved: IntGauge,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let reservations_total = IntCounterVec::new(
            Opts::new(
                "reservations_total",
                "Reservation lifecycle calls by operation and outcome",
            ),
            &["operation", "outcome"],
        )
        .expect("valid reservations_total metric");

        let payments_total = IntCounterVec::new(
            Opts::new("payments_total", "Ride payments by outcome"),
            &["outcome"],
        )
        .expect("valid payments_total metric");

        let ride_distance_meters = Histogram::with_opts(
            HistogramOpts::new("ride_distance_meters", "Distance of ended rides in meters")
                .buckets(vec![100.0, 250.0, 500.0, 1_000.0, 2_500.0, 5_000.0, 10_000.0, 25_000.0]),
        )
        .expect("valid ride_distance_meters metric");

        let scooters_reserved = IntGauge::new(
            "scooters_reserved",
            "Reserved scooters as of the last store write",
        )
        .expect("valid scooters_reserved metric");

        registry
            .register(Box::new(reservations_total.clone()))
            .expect("register reservations_total");
        registry
            .register(Box::new(payments_total.clone()))
            .expect("register payments_total");
        registry
            .register(Box::new(ride_distance_meters.clone()))
            .expect("register ride_distance_meters");
        registry
            .register(Box::new(scooters_reserved.clone()))
            .expect("register scooters_reserved");

        Self {
            registry,
            reservations_total,
            payments_total,
            ride_distance_meters,
            scooters_reserved,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
