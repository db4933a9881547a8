use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::{TimeZone, Utc};
use once_cell::sync::Lazy;
use tempfile::TempDir;
use trip_config::{Config, ConfigManager};
use trip_core::ManualClock;
use trip_planner::PlannerSession;
use trip_storage_json::JsonFileStore;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub struct TestEnv {
    pub base: PathBuf,
    pub config: Config,
    pub store: Arc<JsonFileStore>,
    pub clock: Arc<ManualClock>,
}

/// Isolated storage root and a manual clock starting 2026-10-15 09:00 UTC.
pub fn setup_test_env() -> TestEnv {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let config = Config {
        storage_root: Some(base.join("records")),
        ..Config::default()
    };
    let store = Arc::new(JsonFileStore::new(config.resolve_storage_root()).expect("create store"));
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 10, 15, 9, 0, 0).unwrap(),
    ));

    TestEnv {
        base,
        config,
        store,
        clock,
    }
}

impl TestEnv {
    pub fn open(&self) -> PlannerSession {
        PlannerSession::open_with(self.config.clone(), self.store.clone(), self.clock.clone())
            .expect("open planner session")
    }

    #[allow(dead_code)]
    pub fn config_manager(&self) -> ConfigManager {
        ConfigManager::with_base_dir(self.base.clone()).expect("create config manager")
    }
}
