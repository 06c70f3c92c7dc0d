//! gridwatch: telemetry threshold monitor.
//!
//! Listens for JSON telemetry datagrams, evaluates them against the rules
//! file, and broadcasts an event-count report every period.
//!
//! Ingestion and reporting degrade independently: if one endpoint cannot be
//! bound or fails later, the other keeps running.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use gridwatch_core::config::{load_dotenv, Config};
use gridwatch_core::Notification;
use gridwatch_engine::{
    notification_channel, Evaluator, MonitorContext, NotificationReceiver, ReportScheduler,
    TelemetryReceiver, UdpBroadcastSink,
};
use gridwatch_rules::{RuleLoader, RuleStore};

// ── CLI ─────────────────────────────────────────────────────────────

/// Telemetry threshold monitor with periodic event-count reports.
///
/// Flags win over the environment. Unset flags keep the value `Config`
/// resolved from the environment (and `.env`, and the active profile).
#[derive(Parser, Debug)]
#[command(name = "gridwatch", version, about)]
struct Cli {
    /// Rules file (YAML or JSON list of rules).
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Telemetry listen address, e.g. 0.0.0.0:5005.
    #[arg(long)]
    listen: Option<String>,

    /// Report destination, e.g. 255.255.255.255:5006.
    #[arg(long)]
    report_to: Option<String>,

    /// Report period in milliseconds.
    #[arg(long)]
    period_ms: Option<u64>,

    /// Do not reload the rules file when it changes.
    #[arg(long)]
    no_watch: bool,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(rules) = self.rules {
            config.rules.path = rules;
        }
        if let Some(listen) = self.listen {
            config.telemetry.listen_addr = listen;
        }
        if let Some(dest) = self.report_to {
            config.report.destination = dest;
        }
        if let Some(ms) = self.period_ms {
            config.report.period_ms = ms.max(1);
        }
        if self.no_watch {
            config.rules.watch = false;
        }
    }
}

// ── Notification rendering ──────────────────────────────────────────

/// Stand-in presentation side: renders notifications to the log.
async fn render_notifications(mut rx: NotificationReceiver) {
    while let Some(notification) = rx.recv().await {
        match notification {
            Notification::Event(e) => info!(
                target: "gridwatch::events",
                device_id = e.device_id,
                rule = %e.rule_name,
                "{} {} {} {} (latency {}us)",
                e.parameter,
                e.value,
                e.operator,
                e.threshold,
                e.latency.as_micros()
            ),
            Notification::Counters(c) => info!(
                target: "gridwatch::events",
                total_events = c.total_events,
                deadline_misses = c.deadline_misses,
                "counters updated"
            ),
        }
    }
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let mut config = Config::from_env();
    Cli::parse().apply(&mut config);
    config.log_summary();

    // Rules: start empty if the file is unusable; an editor may fix it later.
    let store = RuleStore::new();
    let mut loader = RuleLoader::new(config.rules.path.clone(), store.clone());
    if let Err(e) = loader.load() {
        warn!(
            path = %config.rules.path.display(),
            error = %e,
            "failed to load rules, starting with none"
        );
    }
    if config.rules.watch {
        if let Err(e) = loader.watch() {
            warn!(error = %e, "rules hot-reload unavailable");
        }
    }

    let (notifier, notifications) = notification_channel();
    tokio::spawn(render_notifications(notifications));

    let ctx = Arc::new(MonitorContext::new(
        Arc::new(store),
        notifier,
        config.telemetry.device_id_field.clone(),
    ));

    let mut components = 0;

    match TelemetryReceiver::bind(
        &config.telemetry.listen_addr,
        Evaluator::new(Arc::clone(&ctx)),
        config.telemetry.max_datagram_bytes,
    )
    .await
    {
        Ok(receiver) => {
            components += 1;
            tokio::spawn(async move {
                if let Err(e) = receiver.run().await {
                    error!(error = %e, "ingestion stopped; reporting continues");
                }
            });
        }
        Err(e) => error!(error = %e, "telemetry receiver disabled"),
    }

    match UdpBroadcastSink::bind(&config.report.bind_addr, &config.report.destination).await {
        Ok(sink) => {
            components += 1;
            let scheduler =
                ReportScheduler::new(Arc::clone(&ctx), Arc::new(sink), config.report.period());
            tokio::spawn(async move { scheduler.run().await });
        }
        Err(e) => error!(error = %e, "report scheduler disabled"),
    }

    if components == 0 {
        anyhow::bail!("neither telemetry ingestion nor reporting could start");
    }

    info!("gridwatch running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    info!(
        total_events = ctx.counters().total(),
        deadline_misses = ctx.deadline_misses(),
        "shutting down"
    );
    drop(loader);
    Ok(())
}
