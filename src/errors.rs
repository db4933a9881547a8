use thiserror::Error;
use trip_config::ConfigError;
use trip_core::CoreError;

/// Failures that can end or abort a planner session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Session already closed")]
    Closed,
}
