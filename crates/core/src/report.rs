//! Periodic summary report broadcast by the scheduler.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::telemetry::DeviceId;

/// Decoupled snapshot of the event counters.
///
/// Owns its data; later counter updates never reach a built report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub timestamp: DateTime<Utc>,
    pub total_events: u64,
    pub per_device: BTreeMap<DeviceId, u64>,
}

impl Report {
    pub fn new(total_events: u64, per_device: BTreeMap<DeviceId, u64>) -> Self {
        Self {
            timestamp: Utc::now(),
            total_events,
            per_device,
        }
    }

    /// Wire payload: compact JSON.
    pub fn to_payload(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }
}
