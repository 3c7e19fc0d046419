//! Structured logging setup

use camview_core::{CamViewError, CamViewResult};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "info";

/// Installs the global `tracing` subscriber
#[derive(Debug, Default)]
pub struct DebugLogger;

impl DebugLogger {
    /// Initialize logging from `RUST_LOG`, falling back to `info`
    pub fn init_logging() -> CamViewResult<()> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        Self::install(filter)
    }

    /// Initialize logging with explicit filter directives, e.g.
    /// `"camview=debug,camview_media=trace"`
    pub fn init_logging_with(directives: &str) -> CamViewResult<()> {
        let filter = EnvFilter::try_new(directives).map_err(|e| CamViewError::Initialization {
            reason: format!("Invalid log filter '{}': {}", directives, e),
        })?;
        Self::install(filter)
    }

    fn install(filter: EnvFilter) -> CamViewResult<()> {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
            .map_err(|e| CamViewError::Initialization {
                reason: format!("Failed to install log subscriber: {}", e),
            })
    }
}
