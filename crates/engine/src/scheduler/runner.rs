use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use gridwatch_core::{Report, Result};

use crate::context::MonitorContext;

use super::guard::InFlight;
use super::sink::ReportSink;

/// Result of one scheduler tick.
#[derive(Debug)]
pub enum TickOutcome {
    /// A send was started; the handle resolves when it finishes.
    Started(JoinHandle<()>),
    /// The previous send was still running; nothing was started.
    Missed { deadline_misses: u64 },
}

/// Fixed-period report sender.
pub struct ReportScheduler {
    ctx: Arc<MonitorContext>,
    sink: Arc<dyn ReportSink>,
    period: Duration,
    in_flight: InFlight,
}

impl ReportScheduler {
    pub fn new(ctx: Arc<MonitorContext>, sink: Arc<dyn ReportSink>, period: Duration) -> Self {
        Self {
            ctx,
            sink,
            period,
            in_flight: InFlight::new(),
        }
    }

    /// Run one cycle.
    ///
    /// If the previous cycle's send is still in flight, counts a deadline
    /// miss, surfaces it to the notification sink and returns without
    /// sending. Otherwise spawns a send of a fresh report. Must be called
    /// from within a tokio runtime.
    pub fn tick(&self) -> TickOutcome {
        let Some(guard) = self.in_flight.try_acquire() else {
            let deadline_misses = self.ctx.record_deadline_miss();
            warn!(deadline_misses, "previous report still sending, skipping cycle");
            self.ctx.publish_counters();
            return TickOutcome::Missed { deadline_misses };
        };

        let ctx = Arc::clone(&self.ctx);
        let sink = Arc::clone(&self.sink);
        TickOutcome::Started(tokio::spawn(async move {
            let _guard = guard;
            let started = Instant::now();
            match send_report(&ctx, sink.as_ref()).await {
                Ok(report) => debug!(
                    total_events = report.total_events,
                    devices = report.per_device.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "report sent"
                ),
                Err(e) => warn!(
                    destination = %sink.destination(),
                    error = %e,
                    "report send failed"
                ),
            }
        }))
    }

    /// Tick every period, forever.
    pub async fn run(&self) {
        info!(
            period_ms = self.period.as_millis() as u64,
            destination = %self.sink.destination(),
            "report scheduler started"
        );
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let _ = self.tick();
        }
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight.is_sending()
    }
}

async fn send_report(ctx: &MonitorContext, sink: &dyn ReportSink) -> Result<Report> {
    let report = ctx.counters().snapshot();
    let payload = report.to_payload()?;
    sink.send(&payload).await?;
    Ok(report)
}
