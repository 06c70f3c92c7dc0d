//! Filesystem event handler for the notify watcher (hot-reload).

use std::ffi::OsStr;
use std::io;
use std::path::Path;

use notify::{Event, EventKind};
use tracing::{info, warn};

use crate::store::RuleStore;

use super::core::load_rules_file;
use super::error::RuleError;

/// Handle a single filesystem event from the notify watcher.
///
/// Events for other files in the watched directory are ignored.
pub(super) fn handle_fs_event(event: &Event, path: &Path, file_name: &OsStr, store: &RuleStore) {
    let concerns_rules_file = event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name));
    if !concerns_rules_file {
        return;
    }

    match &event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => reload(path, store),
        EventKind::Remove(_) => {
            warn!(
                path = %path.display(),
                rules = store.len(),
                "rules file removed, keeping previous rules"
            );
        }
        _ => {}
    }
}

fn reload(path: &Path, store: &RuleStore) {
    match load_rules_file(path) {
        Ok(rules) => {
            let count = rules.len();
            store.replace(rules);
            info!(path = %path.display(), count, "hot-reloaded rules");
        }
        // Renamed away mid-save; the follow-up create event reloads it.
        Err(RuleError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "failed to reload rules, keeping previous version"
            );
        }
    }
}
