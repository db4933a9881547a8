//! trip-config
//!
//! Tunables for the trip planner (debounce windows, draft lifetime, route
//! sampling) plus disk persistence helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{Config, MAX_DELAY_MS, MAX_DRAFT_TTL_DAYS, MAX_RECENT_DRAFT_MINUTES};
