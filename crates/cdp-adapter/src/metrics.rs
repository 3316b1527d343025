//! Prometheus collectors for command round trips. They count from process start but
//! are only exported once [`register_metrics`] has put them into a registry.

use std::time::Duration;

use once_cell::sync::Lazy;
use prometheus::core::Collector;
use prometheus::{histogram_opts, HistogramVec, IntCounterVec, Opts, Registry};
use serde_json::Value;
use tracing::error;

use crate::error::AdapterError;

static COMMANDS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "pagetag_cdp_commands_total",
            "CDP commands sent, by method and outcome",
        ),
        &["method", "outcome"],
    )
    .expect("valid cdp command counter")
});

static ROUND_TRIP: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        histogram_opts!(
            "pagetag_cdp_round_trip_seconds",
            "Latency of answered CDP commands",
            vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0]
        ),
        &["method"],
    )
    .expect("valid cdp latency histogram")
});

/// Adds the adapter's collectors to `registry`. Registering twice is harmless.
pub fn register_metrics(registry: &Registry) {
    let collectors: [Box<dyn Collector>; 2] =
        [Box::new(COMMANDS.clone()), Box::new(ROUND_TRIP.clone())];
    for collector in collectors {
        match registry.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(err) => error!(target: "cdp-adapter", %err, "cannot register cdp metric"),
        }
    }
}

pub fn outcome(result: &Result<Value, AdapterError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(AdapterError::Command { .. }) => "command_error",
        Err(AdapterError::Timeout { .. }) => "timeout",
        Err(AdapterError::SessionClosed(_)) => "closed",
        Err(AdapterError::BadReply { .. }) => "bad_reply",
        Err(AdapterError::Launch(_)) => "launch_failed",
    }
}

/// Counts one finished command; latency is kept only for answered ones.
pub fn record(method: &str, result: &Result<Value, AdapterError>, elapsed: Duration) {
    COMMANDS.with_label_values(&[method, outcome(result)]).inc();
    if matches!(result, Ok(_) | Err(AdapterError::Command { .. })) {
        ROUND_TRIP
            .with_label_values(&[method])
            .observe(elapsed.as_secs_f64());
    }
}

pub fn command_count(method: &str, outcome: &str) -> u64 {
    COMMANDS.with_label_values(&[method, outcome]).get()
}
