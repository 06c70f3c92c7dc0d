//! Threshold rule store for the telemetry monitor.
//!
//! This crate provides:
//! - `Rule` / `Operator` schema with serde (de)serialization
//! - `RuleStore`: ordered, externally-edited rule list with copy-on-read snapshots
//! - `RuleSource`: the read-only capability the evaluation engine depends on
//! - Rules file loader with hot-reload via `notify` watcher

pub mod loader;
pub mod schema;
pub mod store;

pub use loader::{load_rules_file, parse_rules, RuleError, RuleLoader};
pub use schema::{Operator, Rule};
pub use store::{RuleSource, RuleStore};
