//! JSON codec for itinerary days and wizard drafts, plus the two stores that
//! persist them under their fixed keys.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use trip_domain::{DayData, ItineraryPlace, ItineraryState, TripWizardData, TripWizardDraft};
use uuid::Uuid;

use crate::{
    storage::{KeyValueStore, DRAFT_STORAGE_KEY, ITINERARY_STORAGE_KEY},
    CoreError,
};

const STORED_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_DRAFT_TTL_DAYS: i64 = 7;

/// JSON-safe form of [`DayData`] with the date as an ISO string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredDay {
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub places: Vec<ItineraryPlace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drive_time: Option<String>,
}

/// Persisted itinerary record: `{days, activeDay, tripTitle}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoredItinerary {
    pub days: Vec<StoredDay>,
    #[serde(default)]
    pub active_day: usize,
    #[serde(default)]
    pub trip_title: String,
}

pub fn serialize_days(days: &[DayData]) -> Vec<StoredDay> {
    days.iter()
        .map(|day| StoredDay {
            date: day.date.format(STORED_DATE_FORMAT).to_string(),
            title: day.title.clone(),
            places: day.places.clone(),
            mileage: day.mileage,
            drive_time: day.drive_time.clone(),
        })
        .collect()
}

pub fn deserialize_days(days: Vec<StoredDay>) -> Result<Vec<DayData>, CoreError> {
    days.into_iter()
        .map(|day| {
            Ok(DayData {
                date: parse_stored_date(&day.date)?,
                title: day.title,
                places: day.places,
                mileage: day.mileage,
                drive_time: day.drive_time,
            })
        })
        .collect()
}

/// Accepts a plain `YYYY-MM-DD` date or a full RFC 3339 timestamp; the
/// latter keeps only its UTC calendar date.
pub fn parse_stored_date(raw: &str) -> Result<NaiveDate, CoreError> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, STORED_DATE_FORMAT) {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|stamp| stamp.with_timezone(&Utc).date_naive())
        .map_err(|_| CoreError::InvalidDate(raw.to_string()))
}

pub fn encode_itinerary(state: &ItineraryState) -> Result<String, CoreError> {
    let stored = StoredItinerary {
        days: serialize_days(&state.days),
        active_day: state.active_day,
        trip_title: state.trip_title.clone(),
    };
    Ok(serde_json::to_string(&stored)?)
}

pub fn decode_itinerary(raw: &str) -> Result<ItineraryState, CoreError> {
    let stored: StoredItinerary = serde_json::from_str(raw)?;
    Ok(ItineraryState {
        days: deserialize_days(stored.days)?,
        active_day: stored.active_day,
        trip_title: stored.trip_title,
    })
}

/// Reads and writes the itinerary record.
#[derive(Clone)]
pub struct ItineraryStore {
    store: Arc<dyn KeyValueStore>,
}

impl ItineraryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn save(&self, state: &ItineraryState) -> Result<(), CoreError> {
        self.store.set(ITINERARY_STORAGE_KEY, &encode_itinerary(state)?)
    }

    pub fn load(&self) -> Result<Option<ItineraryState>, CoreError> {
        match self.store.get(ITINERARY_STORAGE_KEY)? {
            Some(raw) => decode_itinerary(&raw).map(Some),
            None => Ok(None),
        }
    }

    pub fn clear(&self) -> Result<(), CoreError> {
        self.store.remove(ITINERARY_STORAGE_KEY)
    }
}

/// The part of the wizard that auto-save compares and persists.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub data: TripWizardData,
    pub current_step: u8,
    pub completed_steps: Vec<u8>,
}

impl DraftSnapshot {
    /// Completed steps are stored as a sorted, de-duplicated sequence.
    pub fn new(
        data: TripWizardData,
        current_step: u8,
        completed_steps: impl IntoIterator<Item = u8>,
    ) -> Self {
        let mut completed: Vec<u8> = completed_steps.into_iter().collect();
        completed.sort_unstable();
        completed.dedup();
        Self {
            data,
            current_step,
            completed_steps: completed,
        }
    }

    pub fn from_draft(draft: &TripWizardDraft) -> Self {
        Self::new(draft.data.clone(), draft.current_step, draft.completed_steps.iter().copied())
    }

    /// Stable-ordered JSON: object keys sorted, so equal snapshots compare equal as strings.
    pub fn canonical(&self) -> Result<String, CoreError> {
        let value = serde_json::to_value(self)?;
        Ok(serde_json::to_string(&value)?)
    }
}

/// Reads and writes the single wizard draft slot.
#[derive(Clone)]
pub struct DraftStore {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl DraftStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_ttl(store, Duration::days(DEFAULT_DRAFT_TTL_DAYS))
    }

    pub fn with_ttl(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Writes `snapshot`, reusing `id` when given and minting one otherwise.
    pub fn save(
        &self,
        id: Option<Uuid>,
        snapshot: &DraftSnapshot,
        now: DateTime<Utc>,
    ) -> Result<TripWizardDraft, CoreError> {
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(|| {
            CoreError::InvalidOperation(format!("draft lifetime of {} overflows", self.ttl))
        })?;
        let draft = TripWizardDraft {
            id: id.unwrap_or_else(Uuid::new_v4),
            current_step: snapshot.current_step,
            completed_steps: snapshot.completed_steps.clone(),
            last_updated: now,
            data: snapshot.data.clone(),
            expires_at,
        };
        self.store
            .set(DRAFT_STORAGE_KEY, &serde_json::to_string(&draft)?)?;
        Ok(draft)
    }

    /// Loads the draft; an expired one is removed and reported as absent.
    pub fn load(&self, now: DateTime<Utc>) -> Result<Option<TripWizardDraft>, CoreError> {
        let Some(raw) = self.store.get(DRAFT_STORAGE_KEY)? else {
            return Ok(None);
        };
        let draft: TripWizardDraft = serde_json::from_str(&raw)?;
        if draft.is_expired(now) {
            tracing::debug!(draft_id = %draft.id, "discarding expired wizard draft");
            self.clear()?;
            return Ok(None);
        }
        Ok(Some(draft))
    }

    pub fn clear(&self) -> Result<(), CoreError> {
        self.store.remove(DRAFT_STORAGE_KEY)
    }
}
