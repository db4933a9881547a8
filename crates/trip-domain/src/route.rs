//! Payloads exchanged with the routing, POI, and trip-saving backend.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::place::{LatLng, Place};

/// Points of interest share the place shape.
pub type Poi = Place;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        };
        f.write_str(label)
    }
}

/// Human readable text plus the raw provider value (metres or seconds).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextValue {
    pub text: String,
    pub value: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteStep {
    pub start_location: LatLng,
    pub end_location: LatLng,
    #[serde(default)]
    pub distance: TextValue,
    #[serde(default)]
    pub duration: TextValue,
    #[serde(default)]
    pub instructions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteLeg {
    #[serde(default)]
    pub distance: TextValue,
    #[serde(default)]
    pub duration: TextValue,
    #[serde(default)]
    pub start_address: String,
    #[serde(default)]
    pub end_address: String,
    pub start_location: LatLng,
    pub end_location: LatLng,
    #[serde(default)]
    pub steps: Vec<RouteStep>,
}

/// Raw directions provider reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderResponse {
    pub status: String,
    #[serde(default)]
    pub routes: Vec<ProviderRoute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderRoute {
    #[serde(default)]
    pub overview_polyline: String,
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

/// Normalized route, as returned by `POST /api/route`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouteResponse {
    pub distance: String,
    pub duration: String,
    pub start_address: String,
    pub end_address: String,
    pub polyline: String,
    pub legs: Vec<RouteLeg>,
    pub route_points: Vec<LatLng>,
}

impl RouteResponse {
    pub fn total_distance_meters(&self) -> u64 {
        self.legs.iter().map(|leg| leg.distance.value).sum()
    }

    pub fn total_duration_seconds(&self) -> u64 {
        self.legs.iter().map(|leg| leg.duration.value).sum()
    }
}

/// Body of `POST /api/route`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RouteRequest {
    pub start_location: String,
    pub end_location: String,
    #[serde(default)]
    pub stops: Vec<String>,
}

/// Query of `GET /api/pois`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PoiQuery {
    pub start_location: String,
    pub end_location: String,
}

/// Body of `POST /api/trips/save-route`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveRouteRequest {
    pub title: String,
    pub start_city: String,
    pub end_city: String,
    pub checkpoints: Vec<String>,
    pub route_data: RouteResponse,
    pub pois_data: Vec<Poi>,
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedTrip {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
