//! Evaluates telemetry records against a snapshot of the rule list.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, trace};

use gridwatch_core::{Event, TelemetryRecord};

use crate::context::MonitorContext;

/// Matches records against rules and records the resulting events.
#[derive(Clone)]
pub struct Evaluator {
    ctx: Arc<MonitorContext>,
}

impl Evaluator {
    pub fn new(ctx: Arc<MonitorContext>) -> Self {
        Self { ctx }
    }

    /// Evaluate one record against the current rules.
    ///
    /// The rule list is snapshotted once up front, so concurrent edits are
    /// either fully visible or not at all. Records without a device id are
    /// dropped without touching any counter. A rule whose parameter is
    /// missing or non-numeric in the record is skipped for this record only.
    /// The device-id field is not a parameter; rules naming it never match.
    ///
    /// Each match increments the total and the device's counter and is
    /// forwarded to the notification sink before being returned.
    pub fn evaluate(&self, record: &TelemetryRecord) -> Vec<Event> {
        let started = Instant::now();

        let Some(device_id) = record.device_id(self.ctx.device_id_field()) else {
            trace!(field = %self.ctx.device_id_field(), "record without device id dropped");
            return Vec::new();
        };

        let rules = self.ctx.rules().snapshot();
        let mut events = Vec::new();

        for rule in rules.iter() {
            if rule.parameter == self.ctx.device_id_field() {
                continue;
            }
            let Some(value) = record.numeric(&rule.parameter) else {
                continue;
            };
            if !rule.matches(value) {
                continue;
            }

            let event = Event {
                timestamp: Utc::now(),
                rule_name: rule.name.clone(),
                device_id,
                parameter: rule.parameter.clone(),
                value,
                threshold: rule.threshold,
                operator: rule.operator.to_string(),
                latency: started.elapsed(),
            };

            self.ctx.counters().record(device_id);
            debug!(
                device_id,
                rule = %event.rule_name,
                parameter = %event.parameter,
                value,
                "rule matched"
            );
            self.ctx.notifier().event(event.clone());
            events.push(event);
        }

        if !events.is_empty() {
            self.ctx.publish_counters();
        }

        events
    }

    pub fn context(&self) -> &Arc<MonitorContext> {
        &self.ctx
    }
}
