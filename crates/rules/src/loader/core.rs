//! Core [`RuleLoader`] struct: file-backed rule loading with optional hot-reload.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use crate::schema::Rule;
use crate::store::RuleStore;

use super::error::{Result, RuleError};
use super::watcher::handle_fs_event;

/// Parse a YAML (or JSON) sequence of rules and validate each entry.
pub fn parse_rules(contents: &str) -> Result<Vec<Rule>> {
    let rules: Vec<Rule> = serde_yaml::from_str(contents)?;

    for (index, rule) in rules.iter().enumerate() {
        if rule.name.trim().is_empty() {
            return Err(RuleError::Validation(format!(
                "rule #{index}: name must not be empty"
            )));
        }
        if rule.parameter.trim().is_empty() {
            return Err(RuleError::Validation(format!(
                "rule #{index} '{}': parameter must not be empty",
                rule.name
            )));
        }
        if !rule.threshold.is_finite() {
            return Err(RuleError::Validation(format!(
                "rule #{index} '{}': threshold must be finite",
                rule.name
            )));
        }
        if !rule.operator.is_recognized() {
            // Kept: an unknown operator simply never matches.
            warn!(rule = %rule.name, operator = %rule.operator, "unrecognized rule operator");
        }
    }

    Ok(rules)
}

/// Read and parse a rules file.
pub fn load_rules_file(path: &Path) -> Result<Vec<Rule>> {
    let contents = fs::read_to_string(path)?;
    parse_rules(&contents)
}

/// File-backed rule loader with optional hot-reload.
///
/// Loads the rules file into a shared [`RuleStore`]. With [`watch`] enabled,
/// every change to the file replaces the stored list as a whole; a file that
/// fails to parse leaves the previous list in place.
///
/// [`watch`]: RuleLoader::watch
pub struct RuleLoader {
    /// Path to the rules file.
    path: PathBuf,
    /// Store that receives loaded rules.
    store: RuleStore,
    /// Active filesystem watcher (held to keep it alive).
    _watcher: Option<RecommendedWatcher>,
}

impl RuleLoader {
    pub fn new(path: PathBuf, store: RuleStore) -> Self {
        Self {
            path,
            store,
            _watcher: None,
        }
    }

    /// Load the rules file into the store, replacing its contents.
    ///
    /// Returns the number of rules loaded. On error the store is untouched.
    pub fn load(&self) -> Result<usize> {
        let rules = load_rules_file(&self.path)?;
        let count = rules.len();
        self.store.replace(rules);
        info!(path = %self.path.display(), count, "loaded rules");
        Ok(count)
    }

    /// Start a filesystem watcher on the rules file's directory.
    ///
    /// The directory is watched rather than the file so that editors which
    /// save via write-to-temp + rename are picked up.
    pub fn watch(&mut self) -> Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| {
                RuleError::Validation(format!("not a file path: {}", self.path.display()))
            })?
            .to_os_string();

        let store = self.store.clone();
        let path = self.path.clone();

        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => handle_fs_event(&event, &path, &file_name, &store),
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            },
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        let _ = watcher
            .configure(notify::Config::default().with_poll_interval(Duration::from_millis(500)));

        info!(path = %self.path.display(), "watching rules file for changes");
        self._watcher = Some(watcher);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &RuleStore {
        &self.store
    }

    pub fn is_watching(&self) -> bool {
        self._watcher.is_some()
    }
}
