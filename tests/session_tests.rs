mod common;

use chrono::Duration;
use common::setup_test_env;
use trip_core::{
    Clock, DraftFreshness, ItineraryAction, KeyValueStore, NavOutcome, SaveOutcome, TripWizardPatch,
    DRAFT_STORAGE_KEY, ITINERARY_STORAGE_KEY,
};
use trip_domain::{Place, PlaceSuggestion, TripType, WizardStep};
use trip_planner::{PlannerSession, SessionError, SessionTick};

fn city(id: &str, name: &str, description: &str) -> PlaceSuggestion {
    let mut suggestion = PlaceSuggestion::new(id, description);
    suggestion.main_text = Some(name.to_string());
    suggestion
}

#[test]
fn wizard_progress_is_recovered_in_the_next_session() {
    let env = setup_test_env();
    let mut session = env.open();
    assert!(session.recovery_prompt().is_none());

    session
        .update_wizard(TripWizardPatch::default().trip_type(Some(TripType::OneWay)))
        .expect("edit trip type");
    env.clock.advance_ms(799);
    assert_eq!(session.tick().expect("tick").saved, None);
    env.clock.advance_ms(1);
    assert!(matches!(
        session.tick().expect("tick").saved,
        Some(SaveOutcome::Saved { .. })
    ));
    let draft_id = session.draft_id().expect("draft id assigned");

    assert!(matches!(
        session.handle_key("ArrowRight").expect("key"),
        NavOutcome::Moved { to: WizardStep::Locations, .. }
    ));
    env.clock.advance_ms(150);
    let tick = session.tick().expect("tick");
    assert_eq!(tick.saved, None);
    assert_eq!(
        tick.announcement.map(|a| a.message).as_deref(),
        Some("Step 2 of 7: Locations")
    );

    session
        .update_wizard(
            TripWizardPatch::default()
                .start_location(Some(city("den", "Denver", "Denver, CO, USA")))
                .end_location(Some(city("moab", "Moab", "Moab, UT, USA"))),
        )
        .expect("edit locations");
    session.handle_key("Enter").expect("key");
    assert_eq!(session.form().current_step(), WizardStep::Dates);
    session.close().expect("close");
    assert!(!session.is_open());

    env.clock.advance(Duration::minutes(10));
    let mut next = env.open();
    let prompt = next.recovery_prompt().expect("recovery offered").clone();
    assert_eq!(prompt.freshness, DraftFreshness::Recent);
    insta::assert_snapshot!(prompt.message, @"You were planning your trip (Denver to Moab) 10 minutes ago. Continue where you left off on dates.");

    assert!(next.accept_recovered_draft().expect("accept"));
    assert_eq!(next.form().current_step(), WizardStep::Dates);
    assert_eq!(next.form().completed_steps(), vec![1, 2]);
    assert_eq!(next.draft_id(), Some(draft_id));

    next.update_wizard(TripWizardPatch::default().flexible_dates(true))
        .expect("edit dates");
    env.clock.advance_ms(800);
    match next.tick().expect("tick").saved {
        Some(SaveOutcome::Saved { id, .. }) => assert_eq!(id, draft_id),
        other => panic!("expected a save, got {other:?}"),
    }
}

#[test]
fn stale_draft_can_be_rejected() {
    let env = setup_test_env();
    let mut session = env.open();
    session
        .update_wizard(TripWizardPatch::default().trip_type(Some(TripType::RoundTrip)))
        .expect("edit");
    session.handle_key("ArrowRight").expect("advance");
    session.close().expect("close");

    env.clock.advance(Duration::minutes(45));
    let mut next = env.open();
    let prompt = next.recovery_prompt().expect("recovery offered");
    assert_eq!(prompt.freshness, DraftFreshness::Stale);
    assert_eq!(prompt.title, "Start fresh or continue?");

    next.reject_recovered_draft().expect("reject");
    assert!(next.recovery_prompt().is_none());
    assert_eq!(next.form().current_step(), WizardStep::TripType);
    assert_eq!(env.store.get(DRAFT_STORAGE_KEY).expect("get"), None);
}

#[test]
fn pristine_wizard_is_not_saved_on_close() {
    let env = setup_test_env();
    let mut session = env.open();
    session.close().expect("close");
    session.close().expect("second close is a no-op");
    assert_eq!(env.store.get(DRAFT_STORAGE_KEY).expect("get"), None);

    assert!(matches!(
        session.dispatch(ItineraryAction::AddDay),
        Err(SessionError::Closed)
    ));
    assert_eq!(session.tick().expect("tick"), SessionTick::default());
}

#[test]
fn blocked_step_announces_errors_and_stays_put() {
    let env = setup_test_env();
    let mut session = env.open();
    let outcome = session.handle_key("ArrowRight").expect("key");
    assert_eq!(
        outcome,
        NavOutcome::Blocked {
            step: WizardStep::TripType,
            errors: 1
        }
    );
    assert_eq!(
        session.navigator().focus().map(|f| f.element_id()).as_deref(),
        Some("field-tripType")
    );
    let spoken = session.tick().expect("tick").announcement.expect("announced");
    assert_eq!(spoken.message, "1 error on Trip type. Choose a trip type");
    assert_eq!(session.handle_key("Tab").expect("key"), NavOutcome::Unchanged);
}

#[test]
fn itinerary_uses_configured_title_and_persists() {
    let env = setup_test_env();
    let mut session = env.open();
    assert_eq!(session.itinerary().trip_title, "My Road Trip");
    assert_eq!(session.itinerary().days[0].date, env.clock.now().date_naive());

    session
        .schedule_poi(Place::new("p1", "Garden of the Gods"), 0)
        .expect("schedule");
    session.dispatch(ItineraryAction::AddDay).expect("add day");
    assert!(env
        .store
        .get(ITINERARY_STORAGE_KEY)
        .expect("get")
        .is_some());

    let reopened = env.open();
    assert_eq!(reopened.itinerary(), session.itinerary());
    assert_eq!(reopened.itinerary().active_day, 1);
}

#[test]
fn open_reads_config_from_disk() {
    let env = setup_test_env();
    let manager = env.config_manager();
    let config = trip_config::Config {
        default_trip_title: "Desert Loop".into(),
        ..env.config.clone()
    };
    manager.save(&config).expect("save config");

    let session = PlannerSession::open(&manager).expect("open");
    assert_eq!(session.itinerary().trip_title, "Desert Loop");
    assert_eq!(session.config().storage_root, config.storage_root);
}
