//! Points of interest, autocomplete suggestions, and their itinerary form.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Time assigned to a place when it is scheduled without an explicit one.
pub const DEFAULT_SCHEDULED_TIME: &str = "09:00";

const SCHEDULED_TIME_FORMAT: &str = "%H:%M";

/// WGS84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns true when both axes differ by less than `threshold` degrees.
    pub fn is_near(&self, other: &LatLng, threshold: f64) -> bool {
        (self.lat - other.lat).abs() < threshold && (self.lng - other.lng).abs() < threshold
    }

    /// Great-circle distance in kilometres.
    pub fn distance_km(&self, other: &LatLng) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// A point of interest as returned by the places backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

impl Place {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, location: LatLng) -> Self {
        self.location = Some(location);
        self
    }

    /// Stable identifier, see [`place_identity`].
    pub fn identity(&self) -> String {
        place_identity(self)
    }
}

/// Resolves the stable identifier of a place.
///
/// Precedence: `id`, then `place_id`, then `"{name}@{lat},{lng}"` (five
/// decimals) when coordinates are known, then the bare name. Blank values are
/// skipped.
pub fn place_identity(place: &Place) -> String {
    let explicit = [place.id.as_deref(), place.place_id.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty());
    if let Some(id) = explicit {
        return id.to_string();
    }
    let name = place.name.trim();
    match place.location {
        Some(loc) => format!("{}@{:.5},{:.5}", name, loc.lat, loc.lng),
        None => name.to_string(),
    }
}

/// Candidate location produced by an autocomplete source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceSuggestion {
    pub place_id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LatLng>,
}

impl PlaceSuggestion {
    pub fn new(place_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
            description: description.into(),
            main_text: None,
            secondary_text: None,
            location: None,
        }
    }

    /// Text sent to routing backends: the coordinates when known, else the description.
    pub fn query_text(&self) -> String {
        match self.location {
            Some(loc) => format!("{},{}", loc.lat, loc.lng),
            None => self.description.clone(),
        }
    }
}

/// A place scheduled (or about to be scheduled) on an itinerary day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryPlace {
    #[serde(flatten)]
    pub place: Place,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_order: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ItineraryPlace {
    /// Wraps an unscheduled place.
    pub fn from_place(place: Place) -> Self {
        Self {
            place,
            day_index: None,
            scheduled_time: None,
            day_order: None,
            notes: None,
        }
    }

    pub fn id(&self) -> String {
        self.place.identity()
    }

    /// Parsed scheduled time, falling back to [`DEFAULT_SCHEDULED_TIME`] when
    /// absent or malformed.
    pub fn time_of_day(&self) -> NaiveTime {
        self.scheduled_time
            .as_deref()
            .and_then(parse_scheduled_time)
            .unwrap_or_else(default_time_of_day)
    }
}

impl From<Place> for ItineraryPlace {
    fn from(place: Place) -> Self {
        Self::from_place(place)
    }
}

/// Parses a 24-hour `HH:MM` string.
pub fn parse_scheduled_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), SCHEDULED_TIME_FORMAT).ok()
}

fn default_time_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN)
}

/// Shallow patch applied by the itinerary `UpdatePlace` action.
///
/// There is no `day_index`: moving between days goes through
/// removal and reassignment so the containing-day invariant holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub scheduled_time: Option<String>,
    pub day_order: Option<usize>,
    pub notes: Option<String>,
}

impl PlaceUpdate {
    pub fn scheduled_time(time: impl Into<String>) -> Self {
        Self {
            scheduled_time: Some(time.into()),
            ..Self::default()
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply(&self, target: &mut ItineraryPlace) {
        if let Some(name) = &self.name {
            target.place.name = name.clone();
        }
        if let Some(address) = &self.address {
            target.place.address = Some(address.clone());
        }
        if let Some(time) = &self.scheduled_time {
            target.scheduled_time = Some(time.clone());
        }
        if let Some(order) = self.day_order {
            target.day_order = Some(order);
        }
        if let Some(notes) = &self.notes {
            target.notes = Some(notes.clone());
        }
    }
}
