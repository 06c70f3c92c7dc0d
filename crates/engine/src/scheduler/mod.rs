//! Periodic report scheduler with deadline-miss detection.
//!
//! Every period the scheduler snapshots the counters and sends a [`Report`]
//! through a [`ReportSink`]. Each send runs on its own task; a tick that
//! fires while the previous send is still running is counted as a deadline
//! miss and skipped, so at most one report is ever in flight.
//!
//! [`Report`]: gridwatch_core::Report

mod guard;
mod runner;
mod sink;


pub use self::runner::{ReportScheduler, TickOutcome};
pub use self::sink::{ReportSink, UdpBroadcastSink};
