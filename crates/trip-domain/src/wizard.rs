//! Trip wizard form model, step partition, and persisted drafts.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::place::PlaceSuggestion;

pub const MAX_STOPS: usize = 5;
pub const MAX_INTENTIONS: usize = 8;
pub const MAX_SPECIAL_NEEDS_NOTES: usize = 500;
pub const MAX_ACCESSIBILITY_NOTES: usize = 200;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TripType {
    OneWay,
    RoundTrip,
    MultiCity,
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TripType::OneWay => "One way",
            TripType::RoundTrip => "Round trip",
            TripType::MultiCity => "Multi-city",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Transportation {
    Car,
    Rv,
    Motorcycle,
    Bicycle,
    Train,
    Bus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Lodging {
    Hotel,
    Motel,
    VacationRental,
    Camping,
    Hostel,
    Glamping,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetRange {
    pub min: u32,
    pub max: u32,
}

impl Default for BudgetRange {
    fn default() -> Self {
        Self { min: 500, max: 2000 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecialNeeds {
    pub traveling_with_pets: bool,
    pub traveling_with_children: bool,
    pub dietary_restrictions: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessibilityNeeds {
    pub wheelchair_accessible: bool,
    pub limited_mobility: bool,
    pub visual_impairment: bool,
    pub hearing_impairment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_notes: Option<String>,
}

/// Complete trip wizard form model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TripWizardData {
    pub trip_type: Option<TripType>,
    pub start_location: Option<PlaceSuggestion>,
    pub end_location: Option<PlaceSuggestion>,
    pub stops: Vec<PlaceSuggestion>,
    pub flexible_locations: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub flexible_dates: bool,
    pub transportation: Vec<Transportation>,
    pub lodging: Vec<Lodging>,
    pub budget: BudgetRange,
    pub intentions: Vec<String>,
    pub special_needs: SpecialNeeds,
    pub accessibility: AccessibilityNeeds,
}

impl TripWizardData {
    /// True once any field differs from the defaults.
    pub fn has_user_input(&self) -> bool {
        self != &Self::default()
    }

    pub fn has_locations(&self) -> bool {
        self.start_location.is_some() || self.end_location.is_some() || !self.stops.is_empty()
    }

    pub fn has_dates(&self) -> bool {
        self.flexible_dates || self.start_date.is_some() || self.end_date.is_some()
    }

    /// Trip length in days (inclusive), when both dates are known.
    pub fn trip_length_days(&self) -> Option<i64> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end >= start => Some((end - start).num_days() + 1),
            _ => None,
        }
    }
}

/// The seven wizard steps, each owning a disjoint slice of [`TripWizardData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WizardStep {
    TripType,
    Locations,
    Dates,
    Transportation,
    Lodging,
    Intentions,
    SpecialNeeds,
}

impl WizardStep {
    pub const ALL: [WizardStep; 7] = [
        WizardStep::TripType,
        WizardStep::Locations,
        WizardStep::Dates,
        WizardStep::Transportation,
        WizardStep::Lodging,
        WizardStep::Intentions,
        WizardStep::SpecialNeeds,
    ];

    pub const COUNT: u8 = 7;

    pub fn first() -> Self {
        WizardStep::TripType
    }

    pub fn last() -> Self {
        WizardStep::SpecialNeeds
    }

    /// One-based step number.
    pub fn number(self) -> u8 {
        match self {
            WizardStep::TripType => 1,
            WizardStep::Locations => 2,
            WizardStep::Dates => 3,
            WizardStep::Transportation => 4,
            WizardStep::Lodging => 5,
            WizardStep::Intentions => 6,
            WizardStep::SpecialNeeds => 7,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(self) -> Option<Self> {
        Self::from_number(self.number().checked_sub(1)?)
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::TripType => "Trip type",
            WizardStep::Locations => "Locations",
            WizardStep::Dates => "Dates",
            WizardStep::Transportation => "Transportation",
            WizardStep::Lodging => "Lodging and budget",
            WizardStep::Intentions => "Intentions",
            WizardStep::SpecialNeeds => "Special needs",
        }
    }

    /// Field paths owned by this step, in display order.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            WizardStep::TripType => &["tripType"],
            WizardStep::Locations => {
                &["startLocation", "endLocation", "stops", "flexibleLocations"]
            }
            WizardStep::Dates => &["startDate", "endDate", "flexibleDates"],
            WizardStep::Transportation => &["transportation"],
            WizardStep::Lodging => &["lodging", "budget.min", "budget.max"],
            WizardStep::Intentions => &["intentions"],
            WizardStep::SpecialNeeds => &[
                "specialNeeds",
                "specialNeeds.notes",
                "accessibility",
                "accessibility.otherNotes",
            ],
        }
    }

    /// The step that owns `field`, matching on the top-level segment.
    pub fn owning(field: &str) -> Option<Self> {
        let root = field.split('.').next().unwrap_or(field);
        Self::ALL.into_iter().find(|step| {
            step.fields()
                .iter()
                .any(|owned| owned.split('.').next() == Some(root))
        })
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} of {}: {}", self.number(), Self::COUNT, self.title())
    }
}

/// A persisted, partially completed wizard submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TripWizardDraft {
    pub id: Uuid,
    pub current_step: u8,
    #[serde(default)]
    pub completed_steps: Vec<u8>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub data: TripWizardData,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl TripWizardDraft {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// False only for a draft still on step one with nothing filled in.
    pub fn has_meaningful_progress(&self) -> bool {
        self.current_step > 1 || !self.completed_steps.is_empty() || self.data.has_user_input()
    }

    pub fn step(&self) -> WizardStep {
        WizardStep::from_number(self.current_step).unwrap_or_else(WizardStep::first)
    }
}
