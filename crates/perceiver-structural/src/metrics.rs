//! Telemetry helpers for tagging passes.
//!
//! Plain atomics so callers can surface counters without wiring a metrics backend.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

static PASS_TOTAL: AtomicU64 = AtomicU64::new(0);
static PASS_LAT_NS: AtomicU64 = AtomicU64::new(0);
static PASS_LAT_SAMPLES: AtomicU64 = AtomicU64::new(0);

static CANDIDATES_TOTAL: AtomicU64 = AtomicU64::new(0);
static CONFIRMED_TOTAL: AtomicU64 = AtomicU64::new(0);
static HIT_TEST_FAILURES: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricCounter {
    pub total: u64,
    pub avg_ms: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricSnapshot {
    pub passes: MetricCounter,
    pub candidates: u64,
    pub confirmed: u64,
    /// Share of candidates that survived hit-testing, in percent.
    pub confirm_rate: f64,
    pub hit_test_failures: u64,
}

pub fn record_pass(duration: Duration) {
    PASS_TOTAL.fetch_add(1, Ordering::Relaxed);
    PASS_LAT_NS.fetch_add(duration_to_nanos(duration), Ordering::Relaxed);
    PASS_LAT_SAMPLES.fetch_add(1, Ordering::Relaxed);
}

pub fn record_candidates(count: usize) {
    CANDIDATES_TOTAL.fetch_add(count as u64, Ordering::Relaxed);
}

pub fn record_confirmed(count: usize) {
    CONFIRMED_TOTAL.fetch_add(count as u64, Ordering::Relaxed);
}

pub fn record_hit_test_failure() {
    HIT_TEST_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn snapshot() -> MetricSnapshot {
    let candidates = CANDIDATES_TOTAL.load(Ordering::Relaxed);
    let confirmed = CONFIRMED_TOTAL.load(Ordering::Relaxed);
    let confirm_rate = if candidates == 0 {
        0.0
    } else {
        confirmed as f64 * 100.0 / candidates as f64
    };
    MetricSnapshot {
        passes: make_counter(
            PASS_TOTAL.load(Ordering::Relaxed),
            PASS_LAT_NS.load(Ordering::Relaxed),
            PASS_LAT_SAMPLES.load(Ordering::Relaxed),
        ),
        candidates,
        confirmed,
        confirm_rate,
        hit_test_failures: HIT_TEST_FAILURES.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    for counter in [
        &PASS_TOTAL,
        &PASS_LAT_NS,
        &PASS_LAT_SAMPLES,
        &CANDIDATES_TOTAL,
        &CONFIRMED_TOTAL,
        &HIT_TEST_FAILURES,
    ] {
        counter.store(0, Ordering::Relaxed);
    }
}

fn make_counter(total: u64, nanos: u64, samples: u64) -> MetricCounter {
    let avg_ms = if samples == 0 {
        0.0
    } else {
        (nanos as f64 / samples as f64) / 1_000_000.0
    };
    MetricCounter { total, avg_ms }
}

fn duration_to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
