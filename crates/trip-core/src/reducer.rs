//! Pure state transitions over [`ItineraryState`].
//!
//! `reduce` never fails and never touches storage. Actions that address a
//! day or position that does not exist leave the state unchanged, with one
//! exception: `SetActiveDay` stores whatever index it is given.

use trip_domain::{ItineraryPlace, ItineraryState, PlaceUpdate, DEFAULT_SCHEDULED_TIME};

#[derive(Debug, Clone, PartialEq)]
pub enum ItineraryAction {
    /// Replace the whole state (hydration).
    Init(ItineraryState),
    /// Move the cursor. Not validated.
    SetActiveDay(usize),
    SetTitle(String),
    /// Append a day dated one calendar day after the last one and make it active.
    AddDay,
    /// Remove a day; later days shift one calendar day earlier. The last
    /// remaining day cannot be removed.
    RemoveDay(usize),
    SetDayTitle {
        day_index: usize,
        title: Option<String>,
    },
    SetDayMetrics {
        day_index: usize,
        mileage: Option<f64>,
        drive_time: Option<String>,
    },
    /// Append a place to a day. Ignored when the identifier is already scheduled anywhere.
    AssignPlace {
        place: ItineraryPlace,
        day_index: usize,
    },
    /// Remove every place with this identifier, on every day.
    RemovePlace(String),
    /// Merge `updates` into every place with this identifier.
    UpdatePlace {
        place_id: String,
        updates: PlaceUpdate,
    },
    /// Move a place within one day and renumber that day's `day_order`.
    ReorderPlaces {
        day_index: usize,
        from: usize,
        to: usize,
    },
}

impl ItineraryAction {
    pub fn assign(place: impl Into<ItineraryPlace>, day_index: usize) -> Self {
        ItineraryAction::AssignPlace {
            place: place.into(),
            day_index,
        }
    }

    pub fn remove(place_id: impl Into<String>) -> Self {
        ItineraryAction::RemovePlace(place_id.into())
    }

    pub fn update(place_id: impl Into<String>, updates: PlaceUpdate) -> Self {
        ItineraryAction::UpdatePlace {
            place_id: place_id.into(),
            updates,
        }
    }
}

pub fn reduce(mut state: ItineraryState, action: ItineraryAction) -> ItineraryState {
    match action {
        ItineraryAction::Init(next) => next,
        ItineraryAction::SetActiveDay(index) => {
            state.active_day = index;
            state
        }
        ItineraryAction::SetTitle(title) => {
            state.trip_title = title;
            state
        }
        ItineraryAction::AddDay => add_day(state),
        ItineraryAction::RemoveDay(index) => remove_day(state, index),
        ItineraryAction::SetDayTitle { day_index, title } => {
            if let Some(day) = state.days.get_mut(day_index) {
                day.title = title;
            }
            state
        }
        ItineraryAction::SetDayMetrics {
            day_index,
            mileage,
            drive_time,
        } => {
            if let Some(day) = state.days.get_mut(day_index) {
                day.mileage = mileage;
                day.drive_time = drive_time;
            }
            state
        }
        ItineraryAction::AssignPlace { place, day_index } => assign_place(state, place, day_index),
        ItineraryAction::RemovePlace(place_id) => {
            for day in &mut state.days {
                day.places.retain(|place| place.id() != place_id);
            }
            state
        }
        ItineraryAction::UpdatePlace { place_id, updates } => {
            for place in state
                .days
                .iter_mut()
                .flat_map(|day| day.places.iter_mut())
                .filter(|place| place.id() == place_id)
            {
                updates.apply(place);
            }
            state
        }
        ItineraryAction::ReorderPlaces { day_index, from, to } => {
            reorder_places(state, day_index, from, to)
        }
    }
}

fn add_day(mut state: ItineraryState) -> ItineraryState {
    let Some(next_date) = state.last_date().and_then(|date| date.succ_opt()) else {
        return state;
    };
    state.days.push(trip_domain::DayData::new(next_date));
    state.active_day = state.days.len() - 1;
    state
}

fn remove_day(mut state: ItineraryState, index: usize) -> ItineraryState {
    if state.days.len() <= 1 || index >= state.days.len() {
        return state;
    }
    state.days.remove(index);
    for (position, day) in state.days.iter_mut().enumerate().skip(index) {
        if let Some(previous) = day.date.pred_opt() {
            day.date = previous;
        }
        for place in &mut day.places {
            place.day_index = Some(position);
        }
    }
    if state.active_day > index {
        state.active_day -= 1;
    }
    state.active_day = state.active_day.min(state.days.len() - 1);
    state
}

fn assign_place(
    mut state: ItineraryState,
    mut place: ItineraryPlace,
    day_index: usize,
) -> ItineraryState {
    if day_index >= state.days.len() || state.contains_place(&place.id()) {
        return state;
    }
    let day = &mut state.days[day_index];
    place.day_index = Some(day_index);
    if place.scheduled_time.is_none() {
        place.scheduled_time = Some(DEFAULT_SCHEDULED_TIME.to_string());
    }
    place.day_order = Some(day.places.len());
    day.places.push(place);
    state
}

fn reorder_places(
    mut state: ItineraryState,
    day_index: usize,
    from: usize,
    to: usize,
) -> ItineraryState {
    let Some(day) = state.days.get_mut(day_index) else {
        return state;
    };
    if from >= day.places.len() || to >= day.places.len() {
        return state;
    }
    let moved = day.places.remove(from);
    day.places.insert(to, moved);
    for (order, place) in day.places.iter_mut().enumerate() {
        place.day_order = Some(order);
    }
    state
}
