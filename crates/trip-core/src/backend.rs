//! Contract with the routing, POI, and trip-saving backend.
//!
//! Requests are built from wizard data; every failure is turned into a
//! [`UserNotice`] at this boundary and the operation is abandoned.

use std::fmt;

use trip_domain::{
    ItineraryState, LatLng, PlaceSuggestion, Poi, PoiQuery, RouteRequest, RouteResponse,
    SaveRouteRequest, SavedTrip, TripWizardData,
};

use crate::{directions::is_within_detour_limit, CoreError};

pub trait PlannerBackend {
    /// `POST /api/route`
    fn plan_route(&self, request: &RouteRequest) -> Result<RouteResponse, CoreError>;
    /// `GET /api/pois`
    fn find_pois(&self, query: &PoiQuery) -> Result<Vec<Poi>, CoreError>;
    /// `POST /api/trips/save-route`
    fn save_route(&self, request: &SaveRouteRequest) -> Result<SavedTrip, CoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendAction {
    PlanRoute,
    FindPois,
    SaveRoute,
}

impl fmt::Display for BackendAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BackendAction::PlanRoute => "plan your route",
            BackendAction::FindPois => "load places along your route",
            BackendAction::SaveRoute => "save your trip",
        };
        f.write_str(label)
    }
}

/// Transient, user-facing notification for a failed backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNotice {
    pub action: BackendAction,
    pub title: String,
    pub message: String,
}

pub fn notice_for(action: BackendAction, err: &CoreError) -> UserNotice {
    tracing::warn!(error = %err, %action, "backend call failed");
    let message = match err {
        CoreError::Network(_) | CoreError::Io(_) => {
            format!("We couldn't {action}. Check your connection and try again.")
        }
        CoreError::InvalidOperation(reason) => format!("We couldn't {action}: {reason}."),
        _ => format!("We couldn't {action}. Please try again."),
    };
    UserNotice {
        action,
        title: "Something went wrong".to_string(),
        message,
    }
}

fn label(suggestion: &PlaceSuggestion) -> String {
    suggestion
        .main_text
        .clone()
        .unwrap_or_else(|| suggestion.description.clone())
}

fn endpoints(data: &TripWizardData) -> Result<(&PlaceSuggestion, &PlaceSuggestion), CoreError> {
    let start = data
        .start_location
        .as_ref()
        .ok_or_else(|| CoreError::InvalidOperation("a start location is required".into()))?;
    Ok((start, data.end_location.as_ref().unwrap_or(start)))
}

/// Route request for the wizard's locations; a missing end returns to the start.
pub fn route_request_from(data: &TripWizardData) -> Result<RouteRequest, CoreError> {
    let (start, end) = endpoints(data)?;
    Ok(RouteRequest {
        start_location: start.query_text(),
        end_location: end.query_text(),
        stops: data.stops.iter().map(PlaceSuggestion::query_text).collect(),
    })
}

pub fn poi_query_from(data: &TripWizardData) -> Result<PoiQuery, CoreError> {
    let (start, end) = endpoints(data)?;
    Ok(PoiQuery {
        start_location: start.query_text(),
        end_location: end.query_text(),
    })
}

pub fn save_route_request(
    title: &str,
    data: &TripWizardData,
    route: RouteResponse,
    pois: Vec<Poi>,
    is_public: bool,
) -> Result<SaveRouteRequest, CoreError> {
    let (start, end) = endpoints(data)?;
    Ok(SaveRouteRequest {
        title: title.to_string(),
        start_city: label(start),
        end_city: label(end),
        checkpoints: data.stops.iter().map(label).collect(),
        route_data: route,
        pois_data: pois,
        is_public,
    })
}

/// POIs not yet on the itinerary and, when located, within the detour limit.
pub fn candidate_pois(
    pois: Vec<Poi>,
    itinerary: &ItineraryState,
    route_points: &[LatLng],
    max_detour_km: f64,
) -> Vec<Poi> {
    pois.into_iter()
        .filter(|poi| !itinerary.contains_place(&poi.identity()))
        .filter(|poi| {
            poi.location
                .map_or(true, |at| is_within_detour_limit(&at, route_points, max_detour_km))
        })
        .collect()
}

/// Route plus the POIs found along it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedTrip {
    pub route: RouteResponse,
    pub pois: Vec<Poi>,
}

/// Plans the route, then loads POIs. The first failure abandons the operation.
pub fn plan_trip<B: PlannerBackend + ?Sized>(
    backend: &B,
    data: &TripWizardData,
) -> Result<PlannedTrip, UserNotice> {
    let request =
        route_request_from(data).map_err(|err| notice_for(BackendAction::PlanRoute, &err))?;
    let route = backend
        .plan_route(&request)
        .map_err(|err| notice_for(BackendAction::PlanRoute, &err))?;
    let query = poi_query_from(data).map_err(|err| notice_for(BackendAction::FindPois, &err))?;
    let pois = backend
        .find_pois(&query)
        .map_err(|err| notice_for(BackendAction::FindPois, &err))?;
    tracing::info!(pois = pois.len(), legs = route.legs.len(), "trip planned");
    Ok(PlannedTrip { route, pois })
}

pub fn save_trip<B: PlannerBackend + ?Sized>(
    backend: &B,
    title: &str,
    data: &TripWizardData,
    planned: PlannedTrip,
    is_public: bool,
) -> Result<SavedTrip, UserNotice> {
    let request = save_route_request(title, data, planned.route, planned.pois, is_public)
        .map_err(|err| notice_for(BackendAction::SaveRoute, &err))?;
    let saved = backend
        .save_route(&request)
        .map_err(|err| notice_for(BackendAction::SaveRoute, &err))?;
    tracing::info!(trip_id = %saved.id, "trip saved");
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use trip_domain::{ItineraryPlace, Place};

    #[derive(Default)]
    struct FakeBackend {
        offline: bool,
        requests: RefCell<Vec<RouteRequest>>,
        saved: RefCell<Vec<SaveRouteRequest>>,
    }

    impl PlannerBackend for FakeBackend {
        fn plan_route(&self, request: &RouteRequest) -> Result<RouteResponse, CoreError> {
            if self.offline {
                return Err(CoreError::Network("timeout".into()));
            }
            self.requests.borrow_mut().push(request.clone());
            Ok(RouteResponse {
                distance: "10 km".into(),
                duration: "12 mins".into(),
                start_address: request.start_location.clone(),
                end_address: request.end_location.clone(),
                polyline: String::new(),
                legs: Vec::new(),
                route_points: Vec::new(),
            })
        }

        fn find_pois(&self, _query: &PoiQuery) -> Result<Vec<Poi>, CoreError> {
            Ok(vec![Place::new("poi-1", "Arches")])
        }

        fn save_route(&self, request: &SaveRouteRequest) -> Result<SavedTrip, CoreError> {
            self.saved.borrow_mut().push(request.clone());
            Ok(SavedTrip {
                id: "trip-1".into(),
                title: request.title.clone(),
                is_public: request.is_public,
                created_at: None,
            })
        }
    }

    fn wizard_data() -> TripWizardData {
        let mut start = PlaceSuggestion::new("den", "Denver, CO, USA");
        start.main_text = Some("Denver".into());
        TripWizardData {
            start_location: Some(start),
            stops: vec![PlaceSuggestion::new("gj", "Grand Junction, CO, USA")],
            ..TripWizardData::default()
        }
    }

    #[test]
    fn missing_end_returns_to_start() {
        let request = route_request_from(&wizard_data()).unwrap();
        assert_eq!(request.start_location, "Denver, CO, USA");
        assert_eq!(request.end_location, "Denver, CO, USA");
        assert_eq!(request.stops, vec!["Grand Junction, CO, USA".to_string()]);
        assert!(route_request_from(&TripWizardData::default()).is_err());
    }

    #[test]
    fn plan_and_save_round_trip_through_backend() {
        let backend = FakeBackend::default();
        let planned = plan_trip(&backend, &wizard_data()).unwrap();
        assert_eq!(planned.pois.len(), 1);
        let saved = save_trip(&backend, "Colorado loop", &wizard_data(), planned, false).unwrap();
        assert_eq!(saved.title, "Colorado loop");
        let body = &backend.saved.borrow()[0];
        assert_eq!(body.start_city, "Denver");
        assert_eq!(body.end_city, "Denver");
        assert_eq!(body.checkpoints, vec!["Grand Junction, CO, USA".to_string()]);
    }

    #[test]
    fn network_failure_becomes_notice() {
        let backend = FakeBackend {
            offline: true,
            ..FakeBackend::default()
        };
        let notice = plan_trip(&backend, &wizard_data()).unwrap_err();
        assert_eq!(notice.action, BackendAction::PlanRoute);
        assert!(notice.message.contains("Check your connection"));
        assert!(backend.requests.borrow().is_empty());
    }

    #[test]
    fn candidates_skip_scheduled_and_distant_pois() {
        let start = chrono::NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        let mut itinerary = ItineraryState::new(start);
        itinerary.days[0]
            .places
            .push(ItineraryPlace::from_place(Place::new("poi-1", "Arches")));
        let route = [LatLng::new(38.6, -109.6)];
        let pois = vec![
            Place::new("poi-1", "Arches"),
            Place::new("poi-2", "Dead Horse Point").with_location(LatLng::new(38.55, -109.62)),
            Place::new("poi-3", "Mesa Verde").with_location(LatLng::new(37.2, -108.5)),
            Place::new("poi-4", "Unmapped"),
        ];
        let kept: Vec<String> = candidate_pois(pois, &itinerary, &route, 25.0)
            .iter()
            .map(Place::identity)
            .collect();
        assert_eq!(kept, vec!["poi-2".to_string(), "poi-4".to_string()]);
    }
}
