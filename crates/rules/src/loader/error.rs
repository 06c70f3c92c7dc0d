//! Error types for rule loading and editing.

/// Errors that can occur during rule loading and management.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Rule validation error (e.g. empty name or parameter).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Filesystem watcher error.
    #[error("Notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// Positional edit outside the current list.
    #[error("rule index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result alias for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;
