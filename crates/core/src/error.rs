use thiserror::Error;

#[derive(Error, Debug)]
pub enum GridwatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Transport error: {0}")]
    Transport(std::io::Error),

    #[error("Short send: {sent} of {expected} bytes")]
    ShortSend { sent: usize, expected: usize },
}

pub type Result<T> = std::result::Result<T, GridwatchError>;
