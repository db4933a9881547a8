use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use tempfile::tempdir;
use trip_core::{
    DraftSnapshot, DraftStore, ItineraryAction, ItineraryManager, KeyValueStore,
    DRAFT_STORAGE_KEY, ITINERARY_STORAGE_KEY,
};
use trip_domain::{ItineraryState, Place, TripType, TripWizardData};
use trip_storage_json::JsonFileStore;

#[test]
fn json_store_round_trips_raw_values() {
    let dir = tempdir().expect("tempdir");
    let store = JsonFileStore::new(dir.path().join("records")).expect("create store");

    assert_eq!(store.get("missing").expect("get"), None);
    store.set("greeting", "{\"hello\":\"world\"}").expect("set");
    assert_eq!(
        store.get("greeting").expect("get").as_deref(),
        Some("{\"hello\":\"world\"}")
    );

    let path = store.record_path("greeting");
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("json"));
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    store.remove("greeting").expect("remove");
    store.remove("greeting").expect("remove twice");
    assert_eq!(store.get("greeting").expect("get"), None);
}

#[test]
fn itinerary_survives_reopening_the_store() {
    let dir = tempdir().expect("tempdir");
    let start = NaiveDate::from_ymd_opt(2026, 10, 15).expect("date");
    {
        let store = Arc::new(JsonFileStore::new(dir.path().to_path_buf()).expect("store"));
        let mut manager = ItineraryManager::new(store, ItineraryState::new(start));
        manager.hydrate();
        manager.dispatch(ItineraryAction::assign(Place::new("p1", "Great Sand Dunes"), 0));
        manager.dispatch(ItineraryAction::SetTitle("San Luis Valley".into()));
    }

    let store = Arc::new(JsonFileStore::new(dir.path().to_path_buf()).expect("store"));
    let raw = store
        .get(ITINERARY_STORAGE_KEY)
        .expect("get")
        .expect("itinerary written");
    let parsed: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(parsed["tripTitle"], "San Luis Valley");
    assert_eq!(parsed["days"][0]["date"], "2026-10-15");

    let mut manager = ItineraryManager::new(store, ItineraryState::new(start));
    let state = manager.hydrate();
    assert_eq!(state.trip_title, "San Luis Valley");
    assert_eq!(state.days[0].places[0].id(), "p1");
}

#[test]
fn draft_and_itinerary_are_independent_records() {
    let dir = tempdir().expect("tempdir");
    let store = Arc::new(JsonFileStore::new(dir.path().to_path_buf()).expect("store"));
    let now = Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap();
    let drafts = DraftStore::new(store.clone());
    let data = TripWizardData {
        trip_type: Some(TripType::RoundTrip),
        ..TripWizardData::default()
    };
    let saved = drafts
        .save(None, &DraftSnapshot::new(data, 2, [1]), now)
        .expect("save draft");
    store
        .set(ITINERARY_STORAGE_KEY, "{}")
        .expect("write itinerary");

    assert_eq!(
        store.keys().expect("keys"),
        vec![
            ITINERARY_STORAGE_KEY.to_string(),
            DRAFT_STORAGE_KEY.to_string()
        ]
    );

    drafts.clear().expect("clear draft");
    assert!(store.get(ITINERARY_STORAGE_KEY).expect("get").is_some());
    assert_eq!(drafts.load(now).expect("load"), None);
    assert_eq!(saved.current_step, 2);
}
