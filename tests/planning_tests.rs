mod common;

use std::cell::Cell;

use common::setup_test_env;
use trip_core::{BackendAction, CoreError, DirectionsProvider, PlannerBackend, TripWizardPatch};
use trip_domain::{
    LatLng, Place, PlaceSuggestion, PoiQuery, ProviderResponse, ProviderRoute, RouteLeg,
    RouteRequest, RouteResponse, SaveRouteRequest, SavedTrip, TextValue, TravelMode,
};

struct CannedBackend {
    fail_save: bool,
    route_calls: Cell<usize>,
}

impl CannedBackend {
    fn new(fail_save: bool) -> Self {
        Self {
            fail_save,
            route_calls: Cell::new(0),
        }
    }
}

impl PlannerBackend for CannedBackend {
    fn plan_route(&self, request: &RouteRequest) -> Result<RouteResponse, CoreError> {
        self.route_calls.set(self.route_calls.get() + 1);
        Ok(RouteResponse {
            distance: "571 km".into(),
            duration: "5 hours 40 mins".into(),
            start_address: request.start_location.clone(),
            end_address: request.end_location.clone(),
            polyline: "encoded".into(),
            legs: Vec::new(),
            route_points: vec![LatLng::new(39.74, -104.99), LatLng::new(38.57, -109.55)],
        })
    }

    fn find_pois(&self, _query: &PoiQuery) -> Result<Vec<Place>, CoreError> {
        Ok(vec![
            Place::new("arches", "Arches National Park")
                .with_location(LatLng::new(38.62, -109.6)),
            Place::new("yellowstone", "Yellowstone")
                .with_location(LatLng::new(44.43, -110.59)),
            Place::new("red-rocks", "Red Rocks"),
        ])
    }

    fn save_route(&self, request: &SaveRouteRequest) -> Result<SavedTrip, CoreError> {
        if self.fail_save {
            return Err(CoreError::Network("503 Service Unavailable".into()));
        }
        Ok(SavedTrip {
            id: "trip-42".into(),
            title: request.title.clone(),
            is_public: request.is_public,
            created_at: None,
        })
    }
}

fn locations() -> TripWizardPatch {
    TripWizardPatch::default()
        .start_location(Some(PlaceSuggestion::new("den", "Denver, CO, USA")))
        .end_location(Some(PlaceSuggestion::new("moab", "Moab, UT, USA")))
}

#[test]
fn planning_filters_scheduled_and_far_pois() {
    let env = setup_test_env();
    let mut session = env.open();
    session.update_wizard(locations()).expect("edit");
    session
        .schedule_poi(Place::new("red-rocks", "Red Rocks"), 0)
        .expect("schedule");

    let backend = CannedBackend::new(false);
    let planned = session.plan(&backend).expect("plan");
    let kept: Vec<String> = planned.pois.iter().map(Place::identity).collect();
    assert_eq!(kept, vec!["arches".to_string()]);
    assert_eq!(backend.route_calls.get(), 1);

    let arches = planned.pois[0].clone();
    let saved = session.save(&backend, planned, true).expect("save");
    assert_eq!(saved.title, "My Road Trip");
    assert!(saved.is_public);

    let state = session.schedule_poi(arches, 0).expect("schedule");
    assert_eq!(state.days[0].places.len(), 2);
    assert_eq!(state.days[0].places[1].day_order, Some(1));
}

#[test]
fn failures_surface_as_notices() {
    let env = setup_test_env();
    let session = env.open();
    let backend = CannedBackend::new(true);

    let notice = session.plan(&backend).expect_err("no start location");
    assert_eq!(notice.action, BackendAction::PlanRoute);
    assert_eq!(backend.route_calls.get(), 0);

    let mut session = env.open();
    session.update_wizard(locations()).expect("edit");
    let planned = session.plan(&backend).expect("plan");
    let notice = session.save(&backend, planned, false).expect_err("save fails");
    assert_eq!(notice.action, BackendAction::SaveRoute);
    assert!(notice.message.contains("Check your connection"));
}

struct OneLegProvider;

impl DirectionsProvider for OneLegProvider {
    fn directions(
        &self,
        origin: &str,
        destination: &str,
        _waypoints: &[String],
        _mode: TravelMode,
    ) -> Result<ProviderResponse, CoreError> {
        let leg = RouteLeg {
            distance: TextValue {
                text: "571 km".into(),
                value: 571_000,
            },
            duration: TextValue {
                text: "5 hours 40 mins".into(),
                value: 20_400,
            },
            start_address: origin.to_string(),
            end_address: destination.to_string(),
            start_location: LatLng::new(39.74, -104.99),
            end_location: LatLng::new(38.57, -109.55),
            steps: Vec::new(),
        };
        Ok(ProviderResponse {
            status: "OK".into(),
            routes: vec![ProviderRoute {
                overview_polyline: "encoded".into(),
                legs: vec![leg],
            }],
            error_message: None,
        })
    }
}

#[test]
fn directions_use_configured_limits() {
    let env = setup_test_env();
    let session = env.open();
    let directions = session.directions(OneLegProvider);
    let route = directions
        .route("Denver", "Moab", &[], TravelMode::Driving)
        .expect("route");
    assert_eq!(route.distance, "571 km");
    assert_eq!(route.start_address, "Denver");
    assert_eq!(route.route_points.len(), 2);
    assert!(directions.within_detour_limit(&LatLng::new(38.62, -109.6), Some(&route)));
    assert!(!directions.within_detour_limit(&LatLng::new(44.43, -110.59), Some(&route)));
}
