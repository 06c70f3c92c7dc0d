//! The engine's shared state, built once and handed to every component.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use gridwatch_rules::RuleSource;

use crate::counters::Counters;
use crate::notifications::NotificationSender;

/// Owned core state shared (via `Arc`) by the receiver and the scheduler.
pub struct MonitorContext {
    rules: Arc<dyn RuleSource>,
    counters: Counters,
    deadline_misses: AtomicU64,
    notifier: NotificationSender,
    device_id_field: String,
}

impl MonitorContext {
    pub fn new(
        rules: Arc<dyn RuleSource>,
        notifier: NotificationSender,
        device_id_field: impl Into<String>,
    ) -> Self {
        Self {
            rules,
            counters: Counters::new(),
            deadline_misses: AtomicU64::new(0),
            notifier,
            device_id_field: device_id_field.into(),
        }
    }

    pub fn rules(&self) -> &dyn RuleSource {
        self.rules.as_ref()
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn notifier(&self) -> &NotificationSender {
        &self.notifier
    }

    pub fn device_id_field(&self) -> &str {
        &self.device_id_field
    }

    pub fn deadline_misses(&self) -> u64 {
        self.deadline_misses.load(Ordering::Relaxed)
    }

    /// Count one skipped scheduler cycle. Returns the new count.
    pub fn record_deadline_miss(&self) -> u64 {
        self.deadline_misses.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Push the current counter values to the notification sink.
    pub fn publish_counters(&self) {
        self.notifier
            .counters(self.counters.total(), self.deadline_misses());
    }
}
