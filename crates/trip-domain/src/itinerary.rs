//! Day-by-day itinerary structures.

use chrono::NaiveDate;

use crate::place::ItineraryPlace;

/// Title used when a trip has not been named yet.
pub const DEFAULT_TRIP_TITLE: &str = "My Road Trip";

/// One calendar day of the trip and the places scheduled on it.
#[derive(Debug, Clone, PartialEq)]
pub struct DayData {
    pub date: NaiveDate,
    pub title: Option<String>,
    pub places: Vec<ItineraryPlace>,
    /// Distance driven that day, computed by the routing layer.
    pub mileage: Option<f64>,
    pub drive_time: Option<String>,
}

impl DayData {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            title: None,
            places: Vec::new(),
            mileage: None,
            drive_time: None,
        }
    }

    /// Places ordered by their scheduled time, ties broken by `day_order`.
    pub fn places_by_time(&self) -> Vec<&ItineraryPlace> {
        let mut ordered: Vec<&ItineraryPlace> = self.places.iter().collect();
        ordered.sort_by_key(|place| (place.time_of_day(), place.day_order.unwrap_or(usize::MAX)));
        ordered
    }
}

/// Whole itinerary: the ordered days, the day being edited, and the trip name.
#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryState {
    pub days: Vec<DayData>,
    pub active_day: usize,
    pub trip_title: String,
}

impl ItineraryState {
    /// Creates an itinerary with a single empty day dated `start_date`.
    pub fn new(start_date: NaiveDate) -> Self {
        Self::with_title(start_date, DEFAULT_TRIP_TITLE)
    }

    pub fn with_title(start_date: NaiveDate, title: impl Into<String>) -> Self {
        Self {
            days: vec![DayData::new(start_date)],
            active_day: 0,
            trip_title: title.into(),
        }
    }

    pub fn day(&self, index: usize) -> Option<&DayData> {
        self.days.get(index)
    }

    pub fn active(&self) -> Option<&DayData> {
        self.days.get(self.active_day)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.last().map(|day| day.date)
    }

    pub fn place_count(&self) -> usize {
        self.days.iter().map(|day| day.places.len()).sum()
    }

    /// Locates the first place with identifier `place_id`.
    pub fn find_place(&self, place_id: &str) -> Option<(usize, &ItineraryPlace)> {
        self.days.iter().enumerate().find_map(|(index, day)| {
            day.places
                .iter()
                .find(|place| place.id() == place_id)
                .map(|place| (index, place))
        })
    }

    pub fn contains_place(&self, place_id: &str) -> bool {
        self.find_place(place_id).is_some()
    }
}
