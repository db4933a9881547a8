//! Directions provider wrapper: normalizes provider replies and reduces the
//! route geometry to a handful of evenly spaced points for POI search.

use trip_domain::{LatLng, ProviderResponse, ProviderRoute, RouteLeg, RouteResponse, TravelMode};

use crate::CoreError;

pub const DEFAULT_ROUTE_POINT_TARGET: usize = 10;
pub const DEFAULT_ROUTE_POINT_DEDUPE_DEGREES: f64 = 0.01;
pub const DEFAULT_MAX_DETOUR_KM: f64 = 25.0;

const PROVIDER_OK: &str = "OK";

/// Source of raw directions replies.
pub trait DirectionsProvider {
    fn directions(
        &self,
        origin: &str,
        destination: &str,
        waypoints: &[String],
        mode: TravelMode,
    ) -> Result<ProviderResponse, CoreError>;
}

/// Walks leg and step endpoints, drops near-duplicate neighbours, then keeps
/// `target` points by even index striding (first and last always kept).
pub fn extract_route_points(legs: &[RouteLeg], target: usize, threshold: f64) -> Vec<LatLng> {
    let mut points: Vec<LatLng> = Vec::new();
    let mut push = |point: LatLng| {
        if points.last().map_or(true, |last| !last.is_near(&point, threshold)) {
            points.push(point);
        }
    };
    for leg in legs {
        if leg.steps.is_empty() {
            push(leg.start_location);
            push(leg.end_location);
        }
        for step in &leg.steps {
            push(step.start_location);
            push(step.end_location);
        }
    }
    subsample(points, target)
}

fn subsample(points: Vec<LatLng>, target: usize) -> Vec<LatLng> {
    if points.len() <= target {
        return points;
    }
    match target {
        0 => Vec::new(),
        1 => points.into_iter().take(1).collect(),
        _ => {
            let last = points.len() - 1;
            (0..target)
                .map(|i| points[i * last / (target - 1)])
                .collect()
        }
    }
}

/// `"850 m"` below a kilometre, else `"12.4 km"`.
pub fn format_distance(meters: u64) -> String {
    if meters < 1_000 {
        format!("{meters} m")
    } else {
        format!("{:.1} km", meters as f64 / 1_000.0)
    }
}

/// `"45 mins"`, `"2 hours 5 mins"`, `"1 hour"`.
pub fn format_duration(seconds: u64) -> String {
    let total_minutes = (seconds + 30) / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    let unit = |amount: u64, singular: &str, plural: &str| {
        format!("{amount} {}", if amount == 1 { singular } else { plural })
    };
    match (hours, minutes) {
        (0, m) => unit(m, "min", "mins"),
        (h, 0) => unit(h, "hour", "hours"),
        (h, m) => format!("{} {}", unit(h, "hour", "hours"), unit(m, "min", "mins")),
    }
}

/// Collapses one provider route into the backend's route shape.
pub fn normalize_route(route: &ProviderRoute, target: usize, threshold: f64) -> RouteResponse {
    let distance_meters: u64 = route.legs.iter().map(|leg| leg.distance.value).sum();
    let duration_seconds: u64 = route.legs.iter().map(|leg| leg.duration.value).sum();
    let (distance, duration) = match route.legs.as_slice() {
        [only] if !only.distance.text.is_empty() => {
            (only.distance.text.clone(), only.duration.text.clone())
        }
        _ => (format_distance(distance_meters), format_duration(duration_seconds)),
    };
    RouteResponse {
        distance,
        duration,
        start_address: route
            .legs
            .first()
            .map(|leg| leg.start_address.clone())
            .unwrap_or_default(),
        end_address: route
            .legs
            .last()
            .map(|leg| leg.end_address.clone())
            .unwrap_or_default(),
        polyline: route.overview_polyline.clone(),
        legs: route.legs.clone(),
        route_points: extract_route_points(&route.legs, target, threshold),
    }
}

/// A POI is within the limit when the out-and-back trip from the nearest
/// route point fits in `max_detour_km`. Routes without points never exclude.
pub fn is_within_detour_limit(poi: &LatLng, route_points: &[LatLng], max_detour_km: f64) -> bool {
    route_points
        .iter()
        .map(|point| point.distance_km(poi) * 2.0)
        .fold(None, |best: Option<f64>, detour| {
            Some(best.map_or(detour, |current| current.min(detour)))
        })
        .map_or(true, |detour| detour <= max_detour_km)
}

/// The first route of an `OK` reply. Error statuses and empty route lists
/// become [`CoreError::Provider`].
pub fn first_route(response: &ProviderResponse) -> Result<&ProviderRoute, CoreError> {
    if response.status != PROVIDER_OK {
        let detail = match response.error_message.as_deref() {
            Some(message) if !message.is_empty() => format!("{}: {}", response.status, message),
            _ => response.status.clone(),
        };
        return Err(CoreError::Provider(detail));
    }
    response
        .routes
        .first()
        .ok_or_else(|| CoreError::Provider("no routes returned".into()))
}

/// Calls the provider and degrades every failure to `None`.
pub struct DirectionsService<P> {
    provider: P,
    point_target: usize,
    dedupe_threshold: f64,
    max_detour_km: f64,
}

impl<P: DirectionsProvider> DirectionsService<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            point_target: DEFAULT_ROUTE_POINT_TARGET,
            dedupe_threshold: DEFAULT_ROUTE_POINT_DEDUPE_DEGREES,
            max_detour_km: DEFAULT_MAX_DETOUR_KM,
        }
    }

    pub fn with_route_points(mut self, target: usize, dedupe_threshold: f64) -> Self {
        self.point_target = target;
        self.dedupe_threshold = dedupe_threshold;
        self
    }

    pub fn with_max_detour_km(mut self, max_detour_km: f64) -> Self {
        self.max_detour_km = max_detour_km;
        self
    }

    pub fn route(
        &self,
        origin: &str,
        destination: &str,
        waypoints: &[String],
        mode: TravelMode,
    ) -> Option<RouteResponse> {
        let response = match self.provider.directions(origin, destination, waypoints, mode) {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(error = %err, origin, destination, "directions request failed");
                return None;
            }
        };
        match first_route(&response) {
            Ok(route) => Some(normalize_route(route, self.point_target, self.dedupe_threshold)),
            Err(err) => {
                tracing::warn!(error = %err, origin, destination, "directions unavailable");
                None
            }
        }
    }

    /// Detour check against `route`; an unavailable route never excludes a POI.
    pub fn within_detour_limit(&self, poi: &LatLng, route: Option<&RouteResponse>) -> bool {
        route.map_or(true, |route| {
            is_within_detour_limit(poi, &route.route_points, self.max_detour_km)
        })
    }
}
