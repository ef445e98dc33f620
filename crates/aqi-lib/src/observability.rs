//! Observability for the estimation pipeline
//!
//! Provides:
//! - Prometheus metrics (fits, fit latency, predictions, fetch outcomes, last R²)
//! - Structured logging of pipeline events with tracing

use prometheus::{
    register_gauge, register_histogram, register_int_counter, Encoder, Gauge, Histogram,
    IntCounter, TextEncoder,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for fit latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PipelineMetricsInner> = OnceLock::new();

struct PipelineMetricsInner {
    fit_latency_seconds: Histogram,
    fits_total: IntCounter,
    fit_failures_total: IntCounter,
    predictions_total: IntCounter,
    readings_fetched_total: IntCounter,
    reading_errors_total: IntCounter,
    last_r_squared: Gauge,
}

impl PipelineMetricsInner {
    fn new() -> Self {
        Self {
            fit_latency_seconds: register_histogram!(
                "aqi_fit_latency_seconds",
                "Time spent fitting the regression model",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register fit_latency_seconds"),

            fits_total: register_int_counter!(
                "aqi_fits_total",
                "Total number of successful model fits"
            )
            .expect("Failed to register fits_total"),

            fit_failures_total: register_int_counter!(
                "aqi_fit_failures_total",
                "Total number of failed training attempts"
            )
            .expect("Failed to register fit_failures_total"),

            predictions_total: register_int_counter!(
                "aqi_predictions_total",
                "Total number of index predictions"
            )
            .expect("Failed to register predictions_total"),

            readings_fetched_total: register_int_counter!(
                "aqi_readings_fetched_total",
                "Total number of live readings adapted"
            )
            .expect("Failed to register readings_fetched_total"),

            reading_errors_total: register_int_counter!(
                "aqi_reading_errors_total",
                "Total number of live readings that could not be used"
            )
            .expect("Failed to register reading_errors_total"),

            last_r_squared: register_gauge!(
                "aqi_last_r_squared",
                "R squared of the most recently evaluated model"
            )
            .expect("Failed to register last_r_squared"),
        }
    }
}

/// Handle to the process-wide pipeline metrics.
///
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct PipelineMetrics {
    _private: (),
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PipelineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PipelineMetricsInner {
        GLOBAL_METRICS.get_or_init(PipelineMetricsInner::new)
    }

    pub fn observe_fit(&self, duration_secs: f64, r_squared: f64) {
        self.inner().fit_latency_seconds.observe(duration_secs);
        self.inner().fits_total.inc();
        if r_squared.is_finite() {
            self.inner().last_r_squared.set(r_squared);
        }
    }

    pub fn inc_fit_failures(&self) {
        self.inner().fit_failures_total.inc();
    }

    pub fn inc_predictions(&self, count: u64) {
        self.inner().predictions_total.inc_by(count);
    }

    pub fn inc_readings_fetched(&self) {
        self.inner().readings_fetched_total.inc();
    }

    pub fn inc_reading_errors(&self) {
        self.inner().reading_errors_total.inc();
    }

    pub fn fits_total(&self) -> u64 {
        self.inner().fits_total.get()
    }

    pub fn fit_failures_total(&self) -> u64 {
        self.inner().fit_failures_total.get()
    }

    pub fn predictions_total(&self) -> u64 {
        self.inner().predictions_total.get()
    }

    /// Render all registered metrics in the Prometheus text format
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if encoder.encode(&prometheus::gather(), &mut buffer).is_err() {
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Structured logger for pipeline events
#[derive(Clone)]
pub struct StructuredLogger {
    component: String,
}

impl StructuredLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn log_model_trained(
        &self,
        source: &str,
        model_version: &str,
        train_samples: usize,
        held_out_samples: usize,
        mean_squared_error: f64,
        r_squared: f64,
    ) {
        info!(
            event = "model_trained",
            component = %self.component,
            source = %source,
            model_version = %model_version,
            train_samples = train_samples,
            held_out_samples = held_out_samples,
            mean_squared_error = mean_squared_error,
            r_squared = r_squared,
            "Trained air-quality model"
        );
    }

    pub fn log_training_failed(&self, source: &str, error_code: &str, reason: &str) {
        warn!(
            event = "training_failed",
            component = %self.component,
            source = %source,
            error_code = %error_code,
            reason = %reason,
            "Training failed, continuing without a model"
        );
    }

    pub fn log_reading(&self, city: &str, aqi: f64, category: &str, pollutant: Option<&str>) {
        info!(
            event = "reading_fetched",
            component = %self.component,
            city = %city,
            aqi = aqi,
            category = %category,
            pollutant = ?pollutant,
            "Fetched live reading"
        );
    }

    pub fn log_reading_failed(&self, city: &str, error_code: &str, reason: &str) {
        warn!(
            event = "reading_failed",
            component = %self.component,
            city = %city,
            error_code = %error_code,
            reason = %reason,
            "Live reading unavailable"
        );
    }

    pub fn log_estimate(
        &self,
        city: &str,
        measured_aqi: f64,
        estimated_aqi: f64,
        category: &str,
        model_version: &str,
    ) {
        info!(
            event = "estimate_generated",
            component = %self.component,
            city = %city,
            measured_aqi = measured_aqi,
            estimated_aqi = estimated_aqi,
            deviation = estimated_aqi - measured_aqi,
            category = %category,
            model_version = %model_version,
            "Generated air-quality estimate"
        );
    }
}
