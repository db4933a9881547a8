//! Multi-step form controller binding the wizard model to step validation.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use trip_domain::{
    AccessibilityNeeds, BudgetRange, Lodging, PlaceSuggestion, SpecialNeeds, Transportation,
    TripType, TripWizardData, TripWizardDraft, WizardStep,
};

use crate::{
    codec::DraftSnapshot,
    time::Clock,
    validation::{validate_all, validate_step, ValidationErrors},
};

/// The slice of [`TripWizardData`] owned by one step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepData {
    TripType {
        trip_type: Option<TripType>,
    },
    Locations {
        start_location: Option<PlaceSuggestion>,
        end_location: Option<PlaceSuggestion>,
        stops: Vec<PlaceSuggestion>,
        flexible_locations: bool,
    },
    Dates {
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        flexible_dates: bool,
    },
    Transportation {
        transportation: Vec<Transportation>,
    },
    Lodging {
        lodging: Vec<Lodging>,
        budget: BudgetRange,
    },
    Intentions {
        intentions: Vec<String>,
    },
    SpecialNeeds {
        special_needs: SpecialNeeds,
        accessibility: AccessibilityNeeds,
    },
}

impl StepData {
    pub fn step(&self) -> WizardStep {
        match self {
            StepData::TripType { .. } => WizardStep::TripType,
            StepData::Locations { .. } => WizardStep::Locations,
            StepData::Dates { .. } => WizardStep::Dates,
            StepData::Transportation { .. } => WizardStep::Transportation,
            StepData::Lodging { .. } => WizardStep::Lodging,
            StepData::Intentions { .. } => WizardStep::Intentions,
            StepData::SpecialNeeds { .. } => WizardStep::SpecialNeeds,
        }
    }

    /// Full-slice patch that replaces every field of this step.
    pub fn into_patch(self) -> TripWizardPatch {
        let patch = TripWizardPatch::default();
        match self {
            StepData::TripType { trip_type } => patch.trip_type(trip_type),
            StepData::Locations {
                start_location,
                end_location,
                stops,
                flexible_locations,
            } => patch
                .start_location(start_location)
                .end_location(end_location)
                .stops(stops)
                .flexible_locations(flexible_locations),
            StepData::Dates {
                start_date,
                end_date,
                flexible_dates,
            } => patch
                .start_date(start_date)
                .end_date(end_date)
                .flexible_dates(flexible_dates),
            StepData::Transportation { transportation } => patch.transportation(transportation),
            StepData::Lodging { lodging, budget } => patch.lodging(lodging).budget(budget),
            StepData::Intentions { intentions } => patch.intentions(intentions),
            StepData::SpecialNeeds {
                special_needs,
                accessibility,
            } => patch.special_needs(special_needs).accessibility(accessibility),
        }
    }
}

/// Extracts the slice owned by `step`.
pub fn extract_step_data(step: WizardStep, data: &TripWizardData) -> StepData {
    match step {
        WizardStep::TripType => StepData::TripType {
            trip_type: data.trip_type,
        },
        WizardStep::Locations => StepData::Locations {
            start_location: data.start_location.clone(),
            end_location: data.end_location.clone(),
            stops: data.stops.clone(),
            flexible_locations: data.flexible_locations,
        },
        WizardStep::Dates => StepData::Dates {
            start_date: data.start_date,
            end_date: data.end_date,
            flexible_dates: data.flexible_dates,
        },
        WizardStep::Transportation => StepData::Transportation {
            transportation: data.transportation.clone(),
        },
        WizardStep::Lodging => StepData::Lodging {
            lodging: data.lodging.clone(),
            budget: data.budget,
        },
        WizardStep::Intentions => StepData::Intentions {
            intentions: data.intentions.clone(),
        },
        WizardStep::SpecialNeeds => StepData::SpecialNeeds {
            special_needs: data.special_needs.clone(),
            accessibility: data.accessibility.clone(),
        },
    }
}

/// Partial update of the form model. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripWizardPatch {
    pub trip_type: Option<Option<TripType>>,
    pub start_location: Option<Option<PlaceSuggestion>>,
    pub end_location: Option<Option<PlaceSuggestion>>,
    pub stops: Option<Vec<PlaceSuggestion>>,
    pub flexible_locations: Option<bool>,
    pub start_date: Option<Option<NaiveDate>>,
    pub end_date: Option<Option<NaiveDate>>,
    pub flexible_dates: Option<bool>,
    pub transportation: Option<Vec<Transportation>>,
    pub lodging: Option<Vec<Lodging>>,
    pub budget: Option<BudgetRange>,
    pub intentions: Option<Vec<String>>,
    pub special_needs: Option<SpecialNeeds>,
    pub accessibility: Option<AccessibilityNeeds>,
}

impl TripWizardPatch {
    pub fn trip_type(mut self, value: Option<TripType>) -> Self {
        self.trip_type = Some(value);
        self
    }

    pub fn start_location(mut self, value: Option<PlaceSuggestion>) -> Self {
        self.start_location = Some(value);
        self
    }

    pub fn end_location(mut self, value: Option<PlaceSuggestion>) -> Self {
        self.end_location = Some(value);
        self
    }

    pub fn stops(mut self, value: Vec<PlaceSuggestion>) -> Self {
        self.stops = Some(value);
        self
    }

    pub fn flexible_locations(mut self, value: bool) -> Self {
        self.flexible_locations = Some(value);
        self
    }

    pub fn start_date(mut self, value: Option<NaiveDate>) -> Self {
        self.start_date = Some(value);
        self
    }

    pub fn end_date(mut self, value: Option<NaiveDate>) -> Self {
        self.end_date = Some(value);
        self
    }

    pub fn flexible_dates(mut self, value: bool) -> Self {
        self.flexible_dates = Some(value);
        self
    }

    pub fn transportation(mut self, value: Vec<Transportation>) -> Self {
        self.transportation = Some(value);
        self
    }

    pub fn lodging(mut self, value: Vec<Lodging>) -> Self {
        self.lodging = Some(value);
        self
    }

    pub fn budget(mut self, value: BudgetRange) -> Self {
        self.budget = Some(value);
        self
    }

    pub fn intentions(mut self, value: Vec<String>) -> Self {
        self.intentions = Some(value);
        self
    }

    pub fn special_needs(mut self, value: SpecialNeeds) -> Self {
        self.special_needs = Some(value);
        self
    }

    pub fn accessibility(mut self, value: AccessibilityNeeds) -> Self {
        self.accessibility = Some(value);
        self
    }

    /// Field paths this patch writes.
    pub fn touched_fields(&self) -> Vec<&'static str> {
        let flags = [
            ("tripType", self.trip_type.is_some()),
            ("startLocation", self.start_location.is_some()),
            ("endLocation", self.end_location.is_some()),
            ("stops", self.stops.is_some()),
            ("flexibleLocations", self.flexible_locations.is_some()),
            ("startDate", self.start_date.is_some()),
            ("endDate", self.end_date.is_some()),
            ("flexibleDates", self.flexible_dates.is_some()),
            ("transportation", self.transportation.is_some()),
            ("lodging", self.lodging.is_some()),
            ("budget", self.budget.is_some()),
            ("intentions", self.intentions.is_some()),
            ("specialNeeds", self.special_needs.is_some()),
            ("accessibility", self.accessibility.is_some()),
        ];
        flags
            .into_iter()
            .filter_map(|(field, set)| set.then_some(field))
            .collect()
    }

    pub fn apply(self, data: &mut TripWizardData) {
        if let Some(value) = self.trip_type {
            data.trip_type = value;
        }
        if let Some(value) = self.start_location {
            data.start_location = value;
        }
        if let Some(value) = self.end_location {
            data.end_location = value;
        }
        if let Some(value) = self.stops {
            data.stops = value;
        }
        if let Some(value) = self.flexible_locations {
            data.flexible_locations = value;
        }
        if let Some(value) = self.start_date {
            data.start_date = value;
        }
        if let Some(value) = self.end_date {
            data.end_date = value;
        }
        if let Some(value) = self.flexible_dates {
            data.flexible_dates = value;
        }
        if let Some(value) = self.transportation {
            data.transportation = value;
        }
        if let Some(value) = self.lodging {
            data.lodging = value;
        }
        if let Some(value) = self.budget {
            data.budget = value;
        }
        if let Some(value) = self.intentions {
            data.intentions = value;
        }
        if let Some(value) = self.special_needs {
            data.special_needs = value;
        }
        if let Some(value) = self.accessibility {
            data.accessibility = value;
        }
    }
}

/// Owns the wizard form model, its errors, dirty fields, and step progress.
pub struct WizardFormController {
    data: TripWizardData,
    errors: ValidationErrors,
    dirty: BTreeSet<&'static str>,
    current_step: WizardStep,
    completed: BTreeSet<WizardStep>,
    clock: Arc<dyn Clock>,
}

impl WizardFormController {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            data: TripWizardData::default(),
            errors: ValidationErrors::new(),
            dirty: BTreeSet::new(),
            current_step: WizardStep::first(),
            completed: BTreeSet::new(),
            clock,
        }
    }

    pub fn data(&self) -> &TripWizardData {
        &self.data
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_dirty(&self, field: &str) -> bool {
        self.dirty.contains(field)
    }

    pub fn dirty_fields(&self) -> Vec<&'static str> {
        self.dirty.iter().copied().collect()
    }

    pub fn current_step(&self) -> WizardStep {
        self.current_step
    }

    pub fn completed_steps(&self) -> Vec<u8> {
        self.completed.iter().map(|step| step.number()).collect()
    }

    pub fn is_completed(&self, step: WizardStep) -> bool {
        self.completed.contains(&step)
    }

    /// Furthest step the user may jump to: one past the highest completed step.
    pub fn furthest_reachable_step(&self) -> WizardStep {
        self.completed
            .iter()
            .next_back()
            .map(|step| step.next().unwrap_or(*step))
            .unwrap_or_else(WizardStep::first)
            .max(self.current_step)
    }

    /// Validates `step` against the full model and records its errors.
    pub fn validate_step(&mut self, step: WizardStep) -> bool {
        self.errors.clear_step(step);
        match validate_step(step, &self.data, self.clock.today()) {
            Ok(()) => true,
            Err(errors) => {
                tracing::debug!(
                    step = step.number(),
                    errors = errors.len(),
                    "step validation failed"
                );
                self.errors.merge(errors);
                false
            }
        }
    }

    pub fn step_data(&self, step: WizardStep) -> StepData {
        extract_step_data(step, &self.data)
    }

    /// Merges `patch`, marks its fields dirty, and revalidates the steps it touched.
    pub fn update_step_data(&mut self, patch: TripWizardPatch) {
        let touched = patch.touched_fields();
        patch.apply(&mut self.data);
        let steps: BTreeSet<WizardStep> = touched
            .iter()
            .filter_map(|field| WizardStep::owning(field))
            .collect();
        self.dirty.extend(touched);
        for step in steps {
            self.validate_step(step);
        }
    }

    /// Replaces the model with defaults merged with `overrides` and restarts at step one.
    pub fn reset_form(&mut self, overrides: Option<TripWizardPatch>) {
        let mut data = TripWizardData::default();
        if let Some(patch) = overrides {
            patch.apply(&mut data);
        }
        self.data = data;
        self.errors = ValidationErrors::new();
        self.dirty.clear();
        self.current_step = WizardStep::first();
        self.completed.clear();
    }

    /// Loads a recovered draft: data, current step, and completed steps.
    pub fn restore(&mut self, draft: &TripWizardDraft) {
        self.data = draft.data.clone();
        self.errors = ValidationErrors::new();
        self.dirty.clear();
        self.current_step = draft.step();
        self.completed = draft
            .completed_steps
            .iter()
            .filter_map(|number| WizardStep::from_number(*number))
            .collect();
    }

    /// Validates the current step; on success marks it complete and advances.
    pub fn next_step(&mut self) -> bool {
        let step = self.current_step;
        if !self.validate_step(step) {
            return false;
        }
        self.completed.insert(step);
        if let Some(next) = step.next() {
            self.current_step = next;
        }
        true
    }

    pub fn previous_step(&mut self) -> bool {
        match self.current_step.previous() {
            Some(previous) => {
                self.current_step = previous;
                true
            }
            None => false,
        }
    }

    /// Jumps to a completed step or the furthest reachable one.
    pub fn go_to_step(&mut self, step: WizardStep) -> bool {
        if step == self.current_step {
            return false;
        }
        if step <= self.furthest_reachable_step() {
            self.current_step = step;
            true
        } else {
            false
        }
    }

    /// Validates every step; returns the data when the whole form is valid.
    pub fn submit(&mut self) -> Result<&TripWizardData, ValidationErrors> {
        match validate_all(&self.data, self.clock.today()) {
            Ok(()) => {
                self.errors = ValidationErrors::new();
                self.completed.extend(WizardStep::ALL);
                Ok(&self.data)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    /// What auto-save compares and persists.
    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot::new(
            self.data.clone(),
            self.current_step.number(),
            self.completed_steps(),
        )
    }
}
