pub mod config;
pub mod error;
pub mod event;
pub mod report;
pub mod telemetry;

pub use config::Config;
pub use error::*;
pub use event::*;
pub use report::*;
pub use telemetry::*;
