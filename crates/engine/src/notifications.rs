//! Hand-off channel from the engine to the notification sink.
//!
//! The engine only ever pushes onto the channel; whatever renders the
//! notifications owns the receiving end and runs on its own task.

use tokio::sync::mpsc;
use tracing::debug;

use gridwatch_core::{CounterUpdate, Event, Notification};

pub type NotificationReceiver = mpsc::UnboundedReceiver<Notification>;

/// Create a connected sender/receiver pair.
pub fn notification_channel() -> (NotificationSender, NotificationReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (NotificationSender { tx: Some(tx) }, rx)
}

/// Non-blocking, cloneable sending half.
#[derive(Debug, Clone)]
pub struct NotificationSender {
    tx: Option<mpsc::UnboundedSender<Notification>>,
}

impl NotificationSender {
    /// A sender with no sink attached; every send is dropped.
    pub fn disconnected() -> Self {
        Self { tx: None }
    }

    pub fn send(&self, notification: Notification) {
        let Some(tx) = &self.tx else { return };
        if tx.send(notification).is_err() {
            debug!("notification sink closed, dropping notification");
        }
    }

    pub fn event(&self, event: Event) {
        self.send(Notification::Event(event));
    }

    pub fn counters(&self, total_events: u64, deadline_misses: u64) {
        self.send(Notification::Counters(CounterUpdate {
            total_events,
            deadline_misses,
        }));
    }
}
