//! Core data types for action primitives

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pauses between synthetic input events, letting page handlers observe each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacing {
    /// After moving the pointer onto the target, before pressing
    pub pointer_settle: Duration,
    /// Between mouse-down and mouse-up
    pub press_release: Duration,
    /// Between the two pointer moves of a hover
    pub hover_settle: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            pointer_settle: Duration::from_millis(300),
            press_release: Duration::from_millis(100),
            hover_settle: Duration::from_millis(300),
        }
    }
}

impl Pacing {
    /// No pauses at all; used by tests and scripted replays.
    pub fn immediate() -> Self {
        Self {
            pointer_settle: Duration::ZERO,
            press_release: Duration::ZERO,
            hover_settle: Duration::ZERO,
        }
    }
}

/// Which primitive produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Click,
    Focus,
    Hover,
    Scroll,
    EnterText,
    PressKey,
    Select,
    Navigate,
}

/// Outcome of one action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionReport {
    pub action: ActionKind,

    /// Target annotation number, when the action addressed an element
    pub annotation: Option<i64>,

    /// When the action started
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,

    /// When the action finished
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub finished_at: DateTime<Utc>,

    /// Total latency in milliseconds
    pub latency_ms: u64,

    /// The action returned before the page confirmed it (navigation only)
    pub timed_out: bool,
}

impl ActionReport {
    /// Create a successful action report
    pub fn success(action: ActionKind, started_at: DateTime<Utc>, latency_ms: u64) -> Self {
        Self {
            action,
            annotation: None,
            started_at,
            finished_at: Utc::now(),
            latency_ms,
            timed_out: false,
        }
    }

    pub fn with_annotation(mut self, annotation: i64) -> Self {
        self.annotation = Some(annotation);
        self
    }

    pub fn with_timed_out(mut self, timed_out: bool) -> Self {
        self.timed_out = timed_out;
        self
    }
}
