use std::sync::Arc;

use trip_domain::ItineraryState;

use crate::{
    codec::ItineraryStore,
    reducer::{reduce, ItineraryAction},
    storage::KeyValueStore,
};

/// Detects invariant violations in a loaded itinerary snapshot.
pub fn itinerary_warnings(state: &ItineraryState) -> Vec<String> {
    let mut warnings = Vec::new();
    if state.days.is_empty() {
        warnings.push("itinerary has no days".to_string());
        return warnings;
    }
    if state.active_day >= state.days.len() {
        warnings.push(format!(
            "active day {} outside 0..{}",
            state.active_day,
            state.days.len()
        ));
    }
    for (index, day) in state.days.iter().enumerate() {
        for place in &day.places {
            if place.day_index != Some(index) {
                warnings.push(format!(
                    "place {} on day {} carries day index {:?}",
                    place.id(),
                    index,
                    place.day_index
                ));
            }
        }
    }
    warnings
}

/// Owns the live itinerary, hydrates it once, and writes through on every change.
pub struct ItineraryManager {
    state: ItineraryState,
    fallback: ItineraryState,
    store: ItineraryStore,
    hydrated: bool,
}

impl ItineraryManager {
    /// `initial` is used until hydration and whenever the stored record is unusable.
    pub fn new(store: Arc<dyn KeyValueStore>, initial: ItineraryState) -> Self {
        Self {
            state: initial.clone(),
            fallback: initial,
            store: ItineraryStore::new(store),
            hydrated: false,
        }
    }

    pub fn state(&self) -> &ItineraryState {
        &self.state
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    /// Loads the persisted itinerary. Runs once; later calls are no-ops.
    ///
    /// Missing or malformed records leave the fallback state in place.
    pub fn hydrate(&mut self) -> &ItineraryState {
        if self.hydrated {
            return &self.state;
        }
        self.hydrated = true;
        let loaded = match self.store.load() {
            Ok(Some(state)) => Some(state),
            Ok(None) => {
                tracing::debug!("no stored itinerary, starting fresh");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable itinerary record");
                None
            }
        };
        if let Some(state) = loaded.and_then(|state| self.repair(state)) {
            self.state = reduce(self.state.clone(), ItineraryAction::Init(state));
        }
        &self.state
    }

    /// Applies `action` and persists the result when it changed anything.
    pub fn dispatch(&mut self, action: ItineraryAction) -> &ItineraryState {
        let next = reduce(self.state.clone(), action);
        if next != self.state {
            self.state = next;
            self.persist();
        }
        &self.state
    }

    /// Drops the stored record and returns to the fallback state.
    pub fn reset(&mut self) -> &ItineraryState {
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %err, "failed to clear stored itinerary");
        }
        self.state = self.fallback.clone();
        &self.state
    }

    fn persist(&self) {
        if let Err(err) = self.store.save(&self.state) {
            tracing::warn!(error = %err, "failed to persist itinerary");
        }
    }

    fn repair(&self, mut state: ItineraryState) -> Option<ItineraryState> {
        let warnings = itinerary_warnings(&state);
        if warnings.is_empty() {
            return Some(state);
        }
        for warning in &warnings {
            tracing::warn!(%warning, "repairing stored itinerary");
        }
        if state.days.is_empty() {
            return None;
        }
        if state.active_day >= state.days.len() {
            state.active_day = 0;
        }
        for (index, day) in state.days.iter_mut().enumerate() {
            for place in &mut day.places {
                place.day_index = Some(index);
            }
        }
        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, ITINERARY_STORAGE_KEY};
    use chrono::NaiveDate;
    use trip_domain::{ItineraryPlace, Place};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    #[test]
    fn dispatch_writes_through_only_on_change() {
        let backing = MemoryStore::shared();
        let mut manager = ItineraryManager::new(backing.clone(), ItineraryState::new(today()));
        manager.hydrate();

        manager.dispatch(ItineraryAction::SetTitle("Utah loop".into()));
        assert_eq!(backing.writes(), 1);
        manager.dispatch(ItineraryAction::SetTitle("Utah loop".into()));
        assert_eq!(backing.writes(), 1);
    }

    #[test]
    fn hydrate_restores_previous_session() {
        let backing = MemoryStore::shared();
        {
            let mut first = ItineraryManager::new(backing.clone(), ItineraryState::new(today()));
            first.hydrate();
            first.dispatch(ItineraryAction::assign(Place::new("p1", "Zion"), 0));
            first.dispatch(ItineraryAction::AddDay);
        }
        let mut second = ItineraryManager::new(backing, ItineraryState::new(today()));
        let state = second.hydrate().clone();
        assert_eq!(state.days.len(), 2);
        assert_eq!(state.active_day, 1);
        assert_eq!(state.days[0].places[0].id(), "p1");
        assert_eq!(state.days[1].date, today().succ_opt().unwrap());
    }

    #[test]
    fn hydrate_swallows_malformed_records() {
        let backing = MemoryStore::shared();
        backing.set(ITINERARY_STORAGE_KEY, "{not json").unwrap();
        let mut manager = ItineraryManager::new(backing, ItineraryState::new(today()));
        assert_eq!(manager.hydrate(), &ItineraryState::new(today()));
    }

    #[test]
    fn hydrate_runs_once() {
        let backing = MemoryStore::shared();
        let mut manager = ItineraryManager::new(backing.clone(), ItineraryState::new(today()));
        manager.hydrate();
        manager.dispatch(ItineraryAction::SetTitle("Edited".into()));

        let mut other = ItineraryState::new(today());
        other.trip_title = "Stale".into();
        crate::codec::ItineraryStore::new(backing).save(&other).unwrap();

        assert_eq!(manager.hydrate().trip_title, "Edited");
    }

    #[test]
    fn hydrate_repairs_cursor_and_day_indexes() {
        let backing = MemoryStore::shared();
        let mut broken = ItineraryState::new(today());
        broken.active_day = 9;
        let mut stray = ItineraryPlace::from_place(Place::new("p1", "Bryce"));
        stray.day_index = Some(3);
        broken.days[0].places.push(stray);
        assert_eq!(itinerary_warnings(&broken).len(), 2);
        crate::codec::ItineraryStore::new(backing.clone()).save(&broken).unwrap();

        let mut manager = ItineraryManager::new(backing, ItineraryState::new(today()));
        let state = manager.hydrate();
        assert_eq!(state.active_day, 0);
        assert_eq!(state.days[0].places[0].day_index, Some(0));
        assert!(itinerary_warnings(state).is_empty());
    }
}
