//! Rules file loader with hot-reload via `notify` watcher.
//!
//! Reads an ordered YAML list of threshold rules into a [`RuleStore`] and,
//! when watching, replaces the stored list whenever the file changes on disk.
//!
//! [`RuleStore`]: crate::store::RuleStore

mod core;
mod error;
mod watcher;

#[cfg(test)]
mod tests;

pub use self::core::{load_rules_file, parse_rules, RuleLoader};
pub use self::error::{Result, RuleError};
