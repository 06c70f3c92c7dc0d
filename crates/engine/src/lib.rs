//! Real-time telemetry filtering and periodic reporting engine.
//!
//! This crate provides:
//! - `Counters`: thread-safe total and per-device event counters
//! - `Evaluator`: matches telemetry records against a rule snapshot
//! - `TelemetryReceiver`: ingress loop over a `TelemetrySource` (UDP socket) driving the evaluator
//! - `ReportScheduler`: periodic report broadcast with deadline-miss detection
//! - Notification channel towards the (external) presentation side
//!
//! All shared state lives in one [`MonitorContext`], built once at startup
//! and handed to the receiver and the scheduler by `Arc`.

pub mod context;
pub mod counters;
pub mod evaluator;
pub mod notifications;
pub mod receiver;
pub mod scheduler;

pub use context::MonitorContext;
pub use counters::Counters;
pub use evaluator::Evaluator;
pub use notifications::{notification_channel, NotificationReceiver, NotificationSender};
pub use receiver::{TelemetryReceiver, TelemetrySource};
pub use scheduler::{ReportScheduler, ReportSink, TickOutcome, UdpBroadcastSink};
