//! Step-scoped validation rules for the trip wizard.
//!
//! Each step validates its own slice but reads the full form model, so
//! cross-field rules (start vs end, min vs max) live with the step that owns
//! the field the error is reported on.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use trip_domain::{
    TripWizardData, WizardStep, MAX_ACCESSIBILITY_NOTES, MAX_INTENTIONS, MAX_SPECIAL_NEEDS_NOTES,
    MAX_STOPS,
};

/// Field-level failures keyed by field path (`"startLocation"`, `"budget.max"`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the first message reported for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Drops every error owned by `step`.
    pub fn clear_step(&mut self, step: WizardStep) {
        self.fields
            .retain(|field, _| WizardStep::owning(field) != Some(step));
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, message) in other.fields {
            self.fields.entry(field).or_insert(message);
        }
    }

    /// First failing field of `step`, in the step's display order.
    pub fn first_for_step(&self, step: WizardStep) -> Option<(&str, &str)> {
        step.fields()
            .iter()
            .find_map(|field| self.get(field).map(|message| (*field, message)))
            .or_else(|| {
                self.iter()
                    .find(|(field, _)| WizardStep::owning(field) == Some(step))
            })
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Runs the rules of one step against the full form data.
pub fn validate_step(
    step: WizardStep,
    data: &TripWizardData,
    today: NaiveDate,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    match step {
        WizardStep::TripType => check_trip_type(data, &mut errors),
        WizardStep::Locations => check_locations(data, &mut errors),
        WizardStep::Dates => check_dates(data, today, &mut errors),
        WizardStep::Transportation => check_transportation(data, &mut errors),
        WizardStep::Lodging => check_lodging(data, &mut errors),
        WizardStep::Intentions => check_intentions(data, &mut errors),
        WizardStep::SpecialNeeds => check_special_needs(data, &mut errors),
    }
    errors.into_result()
}

/// Runs every step; used before final submission.
pub fn validate_all(data: &TripWizardData, today: NaiveDate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for step in WizardStep::ALL {
        if let Err(step_errors) = validate_step(step, data, today) {
            errors.merge(step_errors);
        }
    }
    errors.into_result()
}

fn check_trip_type(data: &TripWizardData, errors: &mut ValidationErrors) {
    if data.trip_type.is_none() {
        errors.add("tripType", "Choose a trip type");
    }
}

fn check_locations(data: &TripWizardData, errors: &mut ValidationErrors) {
    if data.start_location.is_none() {
        errors.add("startLocation", "Start location is required");
    }
    if !data.flexible_locations && data.end_location.is_none() {
        errors.add("endLocation", "End location is required unless your route is flexible");
    }
    if let (Some(start), Some(end)) = (&data.start_location, &data.end_location) {
        if start.place_id == end.place_id {
            errors.add("endLocation", "Start and end locations must be different");
        }
    }
    if data.stops.len() > MAX_STOPS {
        errors.add("stops", format!("You can add up to {MAX_STOPS} stops"));
    }
}

fn check_dates(data: &TripWizardData, today: NaiveDate, errors: &mut ValidationErrors) {
    if data.flexible_dates {
        return;
    }
    match data.start_date {
        None => errors.add("startDate", "Start date is required"),
        Some(start) if start < today => errors.add("startDate", "Start date cannot be in the past"),
        Some(_) => {}
    }
    match (data.start_date, data.end_date) {
        (_, None) => errors.add("endDate", "End date is required"),
        (Some(start), Some(end)) if end < start => {
            errors.add("endDate", "End date must be on or after the start date")
        }
        _ => {}
    }
}

fn check_transportation(data: &TripWizardData, errors: &mut ValidationErrors) {
    if data.transportation.is_empty() {
        errors.add("transportation", "Select at least one transportation option");
    }
}

fn check_lodging(data: &TripWizardData, errors: &mut ValidationErrors) {
    if data.lodging.is_empty() {
        errors.add("lodging", "Select at least one lodging option");
    }
    if data.budget.max <= data.budget.min {
        errors.add("budget.max", "Maximum budget must be greater than the minimum");
    }
}

fn check_intentions(data: &TripWizardData, errors: &mut ValidationErrors) {
    if data.intentions.is_empty() {
        errors.add("intentions", "Add at least one intention");
    } else if data.intentions.len() > MAX_INTENTIONS {
        errors.add("intentions", format!("You can add up to {MAX_INTENTIONS} intentions"));
    }
}

fn check_special_needs(data: &TripWizardData, errors: &mut ValidationErrors) {
    if exceeds(data.special_needs.notes.as_deref(), MAX_SPECIAL_NEEDS_NOTES) {
        errors.add(
            "specialNeeds.notes",
            format!("Notes must be {MAX_SPECIAL_NEEDS_NOTES} characters or fewer"),
        );
    }
    if exceeds(data.accessibility.other_notes.as_deref(), MAX_ACCESSIBILITY_NOTES) {
        errors.add(
            "accessibility.otherNotes",
            format!("Notes must be {MAX_ACCESSIBILITY_NOTES} characters or fewer"),
        );
    }
}

fn exceeds(notes: Option<&str>, limit: usize) -> bool {
    notes.map(|text| text.chars().count() > limit).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trip_domain::{Lodging, PlaceSuggestion, Transportation};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    fn denver() -> PlaceSuggestion {
        PlaceSuggestion::new("denver", "Denver, CO, USA")
    }

    fn moab() -> PlaceSuggestion {
        PlaceSuggestion::new("moab", "Moab, UT, USA")
    }

    fn locations(
        start: Option<PlaceSuggestion>,
        end: Option<PlaceSuggestion>,
        flexible: bool,
    ) -> TripWizardData {
        TripWizardData {
            start_location: start,
            end_location: end,
            flexible_locations: flexible,
            ..TripWizardData::default()
        }
    }

    #[test]
    fn locations_require_start() {
        let data = locations(None, Some(moab()), false);
        let errors = validate_step(WizardStep::Locations, &data, today()).unwrap_err();
        assert!(errors.contains("startLocation"));
        assert!(!errors.contains("endLocation"));
    }

    #[test]
    fn flexible_locations_allow_missing_end() {
        let flexible = locations(Some(denver()), None, true);
        assert!(validate_step(WizardStep::Locations, &flexible, today()).is_ok());
        let fixed = locations(Some(denver()), None, false);
        assert!(validate_step(WizardStep::Locations, &fixed, today()).is_err());
    }

    #[test]
    fn identical_start_and_end_rejected_even_when_flexible() {
        for flexible in [false, true] {
            let errors = validate_step(
                WizardStep::Locations,
                &locations(Some(denver()), Some(denver()), flexible),
                today(),
            )
            .unwrap_err();
            assert_eq!(
                errors.get("endLocation"),
                Some("Start and end locations must be different")
            );
        }
    }

    #[test]
    fn too_many_stops_rejected() {
        let mut data = locations(Some(denver()), Some(moab()), false);
        data.stops = (0..6).map(|i| PlaceSuggestion::new(format!("s{i}"), "Stop")).collect();
        let errors = validate_step(WizardStep::Locations, &data, today()).unwrap_err();
        assert!(errors.contains("stops"));
        data.stops.truncate(5);
        assert!(validate_step(WizardStep::Locations, &data, today()).is_ok());
    }

    #[test]
    fn dates_enforce_order_and_today() {
        let mut data = TripWizardData {
            start_date: Some(today() + chrono::Duration::days(3)),
            end_date: Some(today() + chrono::Duration::days(1)),
            ..TripWizardData::default()
        };
        assert!(validate_step(WizardStep::Dates, &data, today()).unwrap_err().contains("endDate"));

        data.end_date = data.start_date;
        assert!(validate_step(WizardStep::Dates, &data, today()).is_ok());

        data.start_date = Some(today() - chrono::Duration::days(1));
        let errors = validate_step(WizardStep::Dates, &data, today()).unwrap_err();
        assert!(errors.contains("startDate"));

        data.start_date = Some(today());
        assert!(validate_step(WizardStep::Dates, &data, today()).is_ok());
    }

    #[test]
    fn flexible_dates_skip_every_rule() {
        let data = TripWizardData {
            start_date: Some(today() + chrono::Duration::days(5)),
            end_date: Some(today() - chrono::Duration::days(5)),
            flexible_dates: true,
            ..TripWizardData::default()
        };
        assert!(validate_step(WizardStep::Dates, &data, today()).is_ok());
    }

    #[test]
    fn selections_budget_and_intentions() {
        let mut data = TripWizardData::default();
        assert!(validate_step(WizardStep::Transportation, &data, today()).is_err());
        data.transportation.push(Transportation::Car);
        assert!(validate_step(WizardStep::Transportation, &data, today()).is_ok());

        data.lodging.push(Lodging::Camping);
        data.budget.max = data.budget.min;
        let errors = validate_step(WizardStep::Lodging, &data, today()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains("budget.max"));

        assert!(validate_step(WizardStep::Intentions, &data, today()).is_err());
        data.intentions = (0..9).map(|i| format!("tag{i}")).collect();
        assert!(validate_step(WizardStep::Intentions, &data, today()).is_err());
        data.intentions.truncate(8);
        assert!(validate_step(WizardStep::Intentions, &data, today()).is_ok());
    }

    #[test]
    fn notes_limits_count_characters() {
        let mut data = TripWizardData::default();
        data.special_needs.notes = Some("é".repeat(500));
        data.accessibility.other_notes = Some("x".repeat(200));
        assert!(validate_step(WizardStep::SpecialNeeds, &data, today()).is_ok());

        data.accessibility.other_notes = Some("x".repeat(201));
        let errors = validate_step(WizardStep::SpecialNeeds, &data, today()).unwrap_err();
        assert!(errors.contains("accessibility.otherNotes"));
        assert_eq!(
            errors.first_for_step(WizardStep::SpecialNeeds).map(|(f, _)| f),
            Some("accessibility.otherNotes")
        );
    }

    #[test]
    fn clear_step_only_touches_owned_fields() {
        let mut errors = ValidationErrors::new();
        errors.add("startLocation", "missing");
        errors.add("endDate", "missing");
        errors.clear_step(WizardStep::Locations);
        assert!(!errors.contains("startLocation"));
        assert!(errors.contains("endDate"));
    }
}
