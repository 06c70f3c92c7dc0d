//! Match events and the notifications handed to the presentation side.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::telemetry::DeviceId;

/// Outcome of one record matching one rule.
///
/// Only the counter increments and the notification survive an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub rule_name: String,
    pub device_id: DeviceId,
    pub parameter: String,
    pub value: f64,
    pub threshold: f64,
    pub operator: String,
    /// Time from evaluation start until the match was recorded.
    #[serde(rename = "latencyMicros", serialize_with = "as_micros")]
    pub latency: Duration,
}

fn as_micros<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_micros()).unwrap_or(u64::MAX))
}

/// Counter values surfaced after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterUpdate {
    pub total_events: u64,
    pub deadline_misses: u64,
}

/// Message pushed from the engine to the notification sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Notification {
    Event(Event),
    Counters(CounterUpdate),
}
