use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

pub mod names {
    pub const FIXES: &str = "terra_fixes_total";
    pub const FIXES_IGNORED: &str = "terra_fixes_ignored_total";
    pub const CAPTURES: &str = "terra_captures_total";
    pub const CAPTURE_FAILURES: &str = "terra_capture_failures_total";
    pub const COLLECTIBLES_SPAWNED: &str = "terra_collectibles_spawned_total";
    pub const COLLECTIBLES_COLLECTED: &str = "terra_collectibles_collected_total";
    pub const COLLECTIBLES_EXPIRED: &str = "terra_collectibles_expired_total";
    pub const REGIONS_LIVE: &str = "terra_regions_live";
}

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
    pub metrics_addr: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ObservabilityHandle {
    pub service_name: String,
    pub metrics_enabled: bool,
}

/// Logs go to stderr; stdout carries the event stream.
pub fn init(config: &ObservabilityConfig) -> ObservabilityHandle {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);

    let metrics_enabled = init_metrics(config);
    if metrics_enabled {
        describe_metrics();
    }

    ObservabilityHandle {
        service_name: config.service_name.clone(),
        metrics_enabled,
    }
}

pub fn log_startup(handle: &ObservabilityHandle, environment: &str) {
    tracing::info!(
        service = %handle.service_name,
        environment = %environment,
        metrics_enabled = handle.metrics_enabled,
        "terra service starting"
    );
}

fn describe_metrics() {
    describe_counter!(names::FIXES, "Location fixes received");
    describe_counter!(names::FIXES_IGNORED, "Location fixes dropped as invalid");
    describe_counter!(names::CAPTURES, "Regions captured, by mode");
    describe_counter!(
        names::CAPTURE_FAILURES,
        "Captures that could not be materialized or stored"
    );
    describe_counter!(names::COLLECTIBLES_SPAWNED, "Collectibles spawned, by kind");
    describe_counter!(names::COLLECTIBLES_COLLECTED, "Collectibles picked up, by kind");
    describe_counter!(names::COLLECTIBLES_EXPIRED, "Collectibles expired, by kind");
    describe_gauge!(names::REGIONS_LIVE, "Regions whose lock has not expired");
}

fn init_metrics(config: &ObservabilityConfig) -> bool {
    let Some(addr) = config.metrics_addr.as_ref() else {
        return false;
    };
    let addr: SocketAddr = match addr.parse() {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!(
                service = %config.service_name,
                error = %err,
                "Invalid TERRA_METRICS_ADDR value"
            );
            return false;
        }
    };

    let builder = PrometheusBuilder::new()
        .with_http_listener(addr)
        .add_global_label("service", config.service_name.clone())
        .add_global_label("environment", config.environment.clone());

    match builder.install() {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(
                service = %config.service_name,
                error = %err,
                "Failed to initialize Prometheus exporter"
            );
            false
        }
    }
}
