use std::path::PathBuf;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

const APP_DIR: &str = "trip_planner";

/// Upper bound for the autosave and announcement delays.
pub const MAX_DELAY_MS: i64 = 60_000;
/// One week.
pub const MAX_RECENT_DRAFT_MINUTES: i64 = 7 * 24 * 60;
pub const MAX_DRAFT_TTL_DAYS: i64 = 3_650;

const DEFAULT_AUTOSAVE_DEBOUNCE_MS: i64 = 800;
const DEFAULT_RECENT_DRAFT_MINUTES: i64 = 30;
const DEFAULT_DRAFT_TTL_DAYS: i64 = 7;
const DEFAULT_ANNOUNCEMENT_DELAY_MS: i64 = 150;

/// Planner tunables. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub autosave_debounce_ms: i64,
    /// Drafts younger than this are offered as "continue where you left off".
    pub recent_draft_minutes: i64,
    pub draft_ttl_days: i64,
    pub announcement_delay_ms: i64,
    pub route_point_target: usize,
    pub route_point_dedupe_degrees: f64,
    pub max_detour_km: f64,
    pub default_trip_title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for persisted records. Defaults to the
    /// platform data dir.
    pub storage_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: DEFAULT_AUTOSAVE_DEBOUNCE_MS,
            recent_draft_minutes: DEFAULT_RECENT_DRAFT_MINUTES,
            draft_ttl_days: DEFAULT_DRAFT_TTL_DAYS,
            announcement_delay_ms: DEFAULT_ANNOUNCEMENT_DELAY_MS,
            route_point_target: 10,
            route_point_dedupe_degrees: 0.01,
            max_detour_km: 25.0,
            default_trip_title: "My Road Trip".into(),
            storage_root: None,
        }
    }
}

impl Config {
    // The duration helpers fall back to the default when a value has not been
    // through `validate` and does not fit in a `Duration`.

    pub fn autosave_delay(&self) -> Duration {
        Duration::try_milliseconds(self.autosave_debounce_ms)
            .unwrap_or_else(|| Duration::milliseconds(DEFAULT_AUTOSAVE_DEBOUNCE_MS))
    }

    pub fn recent_draft_window(&self) -> Duration {
        Duration::try_minutes(self.recent_draft_minutes)
            .unwrap_or_else(|| Duration::minutes(DEFAULT_RECENT_DRAFT_MINUTES))
    }

    pub fn draft_ttl(&self) -> Duration {
        Duration::try_days(self.draft_ttl_days)
            .unwrap_or_else(|| Duration::days(DEFAULT_DRAFT_TTL_DAYS))
    }

    pub fn announcement_delay(&self) -> Duration {
        Duration::try_milliseconds(self.announcement_delay_ms)
            .unwrap_or_else(|| Duration::milliseconds(DEFAULT_ANNOUNCEMENT_DELAY_MS))
    }

    pub fn resolve_storage_root(&self) -> PathBuf {
        if let Some(path) = &self.storage_root {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join(APP_DIR)
    }

    /// Rejects values the controllers cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bounded = [
            ("autosave_debounce_ms", self.autosave_debounce_ms, 0, MAX_DELAY_MS),
            ("announcement_delay_ms", self.announcement_delay_ms, 0, MAX_DELAY_MS),
            ("recent_draft_minutes", self.recent_draft_minutes, 0, MAX_RECENT_DRAFT_MINUTES),
            ("draft_ttl_days", self.draft_ttl_days, 1, MAX_DRAFT_TTL_DAYS),
        ];
        for (field, value, min, max) in bounded {
            if !(min..=max).contains(&value) {
                return Err(invalid(field, &format!("must be between {min} and {max}")));
            }
        }
        if self.route_point_target < 2 {
            return Err(invalid("route_point_target", "must keep at least two points"));
        }
        if self.route_point_dedupe_degrees.is_nan() || self.route_point_dedupe_degrees < 0.0 {
            return Err(invalid("route_point_dedupe_degrees", "must be zero or positive"));
        }
        if self.max_detour_km.is_nan() || self.max_detour_km <= 0.0 {
            return Err(invalid("max_detour_km", "must be positive"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}
