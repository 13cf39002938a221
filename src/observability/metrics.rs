use prometheus::{
    Encoder, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub bookings_total: IntCounterVec,
    pub booking_latency_seconds: HistogramVec,
    pub workflows_open: IntGauge,
    pub catalog_queries_total: IntCounter,
    pub session_events_total: IntCounterVec,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let bookings_total = IntCounterVec::new(
            Opts::new("bookings_total", "Booking submissions by outcome"),
            &["outcome"],
        )
        .expect("valid bookings_total metric");

        let booking_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "booking_latency_seconds",
                "Latency of booking submission in seconds",
            ),
            &["outcome"],
        )
        .expect("valid booking_latency_seconds metric");

        let workflows_open = IntGauge::new("workflows_open", "Booking workflows currently open")
            .expect("valid workflows_open metric");

        let catalog_queries_total =
            IntCounter::new("catalog_queries_total", "Catalog filter queries served")
                .expect("valid catalog_queries_total metric");

        let session_events_total = IntCounterVec::new(
            Opts::new("session_events_total", "Session lifecycle events"),
            &["event"],
        )
        .expect("valid session_events_total metric");

        registry
            .register(Box::new(bookings_total.clone()))
            .expect("register bookings_total");
        registry
            .register(Box::new(booking_latency_seconds.clone()))
            .expect("register booking_latency_seconds");
        registry
            .register(Box::new(workflows_open.clone()))
            .expect("register workflows_open");
        registry
            .register(Box::new(catalog_queries_total.clone()))
            .expect("register catalog_queries_total");
        registry
            .register(Box::new(session_events_total.clone()))
            .expect("register session_events_total");

        Self {
            registry,
            bookings_total,
            booking_latency_seconds,
            workflows_open,
            catalog_queries_total,
            session_events_total,
        }
    }

    pub fn record_booking(&self, outcome: &str, elapsed_seconds: f64) {
        self.bookings_total.with_label_values(&[outcome]).inc();
        self.booking_latency_seconds
            .with_label_values(&[outcome])
            .observe(elapsed_seconds);
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
