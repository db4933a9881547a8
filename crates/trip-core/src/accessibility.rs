//! Keyboard step navigation, focus targets, and screen-reader announcements.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Duration;
use trip_domain::WizardStep;

use crate::{debounce::DebounceSlot, time::Clock, wizard_form::WizardFormController, CoreError};

pub const DEFAULT_ANNOUNCEMENT_DELAY_MS: i64 = 150;

/// Keys the wizard reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Next,
    Previous,
    First,
    Last,
    Activate,
    Escape,
}

impl FromStr for NavKey {
    type Err = CoreError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key {
            "ArrowRight" => Ok(NavKey::Next),
            "ArrowLeft" => Ok(NavKey::Previous),
            "Home" => Ok(NavKey::First),
            "End" => Ok(NavKey::Last),
            "Enter" => Ok(NavKey::Activate),
            "Escape" | "Esc" => Ok(NavKey::Escape),
            other => Err(CoreError::InvalidOperation(format!("unhandled key `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Politeness {
    Polite,
    Assertive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub message: String,
    pub politeness: Politeness,
}

impl Announcement {
    pub fn polite(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            politeness: Politeness::Polite,
        }
    }

    pub fn assertive(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            politeness: Politeness::Assertive,
        }
    }
}

/// Live-region writer. Polite messages are debounced so rapid changes read
/// once; assertive messages replace anything pending and are delivered on the
/// next tick.
pub struct Announcer {
    clock: Arc<dyn Clock>,
    slot: DebounceSlot<Announcement>,
    urgent: Option<Announcement>,
    current: Option<Announcement>,
}

impl Announcer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_delay(clock, Duration::milliseconds(DEFAULT_ANNOUNCEMENT_DELAY_MS))
    }

    pub fn with_delay(clock: Arc<dyn Clock>, delay: Duration) -> Self {
        Self {
            clock,
            slot: DebounceSlot::new(delay),
            urgent: None,
            current: None,
        }
    }

    pub fn announce(&mut self, announcement: Announcement) {
        match announcement.politeness {
            Politeness::Polite => {
                self.slot.arm(self.clock.now(), announcement);
            }
            Politeness::Assertive => {
                self.slot.cancel();
                self.urgent = Some(announcement);
            }
        }
    }

    /// Delivers whatever is due and makes it the live-region text.
    pub fn tick(&mut self) -> Option<Announcement> {
        let due = self
            .urgent
            .take()
            .or_else(|| self.slot.take_due(self.clock.now()))?;
        tracing::debug!(message = %due.message, politeness = ?due.politeness, "announcing");
        self.current = Some(due.clone());
        Some(due)
    }

    pub fn current(&self) -> Option<&Announcement> {
        self.current.as_ref()
    }

    pub fn has_pending(&self) -> bool {
        self.urgent.is_some() || self.slot.is_armed()
    }

    pub fn cancel(&mut self) {
        self.slot.cancel();
        self.urgent = None;
    }
}

/// Element that should receive focus after a navigation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusTarget {
    StepHeading(WizardStep),
    Field(String),
}

impl FocusTarget {
    pub fn element_id(&self) -> String {
        match self {
            FocusTarget::StepHeading(step) => format!("wizard-step-{}-heading", step.number()),
            FocusTarget::Field(path) => format!("field-{}", path.replace('.', "-")),
        }
    }
}

impl fmt::Display for FocusTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.element_id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavOutcome {
    Moved { from: WizardStep, to: WizardStep },
    /// Validation of `step` failed; advancement was refused.
    Blocked { step: WizardStep, errors: usize },
    Submitted,
    Escaped,
    Unchanged,
}

/// Applies navigation keys to the wizard and tracks focus and announcements.
pub struct StepNavigator {
    announcer: Announcer,
    focus: Option<FocusTarget>,
}

impl StepNavigator {
    pub fn new(announcer: Announcer) -> Self {
        Self {
            announcer,
            focus: None,
        }
    }

    pub fn focus(&self) -> Option<&FocusTarget> {
        self.focus.as_ref()
    }

    pub fn announcer(&self) -> &Announcer {
        &self.announcer
    }

    pub fn announcer_mut(&mut self) -> &mut Announcer {
        &mut self.announcer
    }

    pub fn tick(&mut self) -> Option<Announcement> {
        self.announcer.tick()
    }

    /// Parses a DOM-style key name; unknown keys are ignored.
    pub fn handle_key_name(&mut self, key: &str, form: &mut WizardFormController) -> NavOutcome {
        match key.parse::<NavKey>() {
            Ok(key) => self.handle_key(key, form),
            Err(_) => NavOutcome::Unchanged,
        }
    }

    pub fn handle_key(&mut self, key: NavKey, form: &mut WizardFormController) -> NavOutcome {
        let from = form.current_step();
        match key {
            NavKey::Next => self.advance(form),
            NavKey::Activate if from == WizardStep::last() => self.submit(form),
            NavKey::Activate => self.advance(form),
            NavKey::Previous => {
                form.previous_step();
                self.settle(from, form)
            }
            NavKey::First => {
                form.go_to_step(WizardStep::first());
                self.settle(from, form)
            }
            NavKey::Last => {
                let target = form.furthest_reachable_step();
                form.go_to_step(target);
                self.settle(from, form)
            }
            NavKey::Escape => {
                self.focus = Some(FocusTarget::StepHeading(from));
                NavOutcome::Escaped
            }
        }
    }

    /// Focus target for `step`: its first errored field, else its heading.
    pub fn focus_for(step: WizardStep, form: &WizardFormController) -> FocusTarget {
        form.errors()
            .first_for_step(step)
            .map(|(field, _)| FocusTarget::Field(field.to_string()))
            .unwrap_or(FocusTarget::StepHeading(step))
    }

    fn advance(&mut self, form: &mut WizardFormController) -> NavOutcome {
        let from = form.current_step();
        if form.next_step() {
            self.settle(from, form)
        } else {
            self.block(from, form)
        }
    }

    fn submit(&mut self, form: &mut WizardFormController) -> NavOutcome {
        if form.submit().is_ok() {
            self.announcer
                .announce(Announcement::polite("Trip details complete"));
            return NavOutcome::Submitted;
        }
        let step = WizardStep::ALL
            .into_iter()
            .find(|step| form.errors().first_for_step(*step).is_some())
            .unwrap_or_else(|| form.current_step());
        form.go_to_step(step);
        self.block(step, form)
    }

    fn settle(&mut self, from: WizardStep, form: &WizardFormController) -> NavOutcome {
        let to = form.current_step();
        if to == from {
            return NavOutcome::Unchanged;
        }
        self.announcer.announce(Announcement::polite(to.to_string()));
        self.focus = Some(FocusTarget::StepHeading(to));
        NavOutcome::Moved { from, to }
    }

    fn block(&mut self, step: WizardStep, form: &WizardFormController) -> NavOutcome {
        let errors = form
            .errors()
            .iter()
            .filter(|(field, _)| WizardStep::owning(field) == Some(step))
            .count();
        let first = form
            .errors()
            .first_for_step(step)
            .map(|(_, message)| message.to_string())
            .unwrap_or_default();
        let noun = if errors == 1 { "error" } else { "errors" };
        self.announcer.announce(Announcement::assertive(format!(
            "{errors} {noun} on {}. {first}",
            step.title()
        )));
        self.focus = Some(Self::focus_for(step, form));
        NavOutcome::Blocked { step, errors }
    }
}
