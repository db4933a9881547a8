//! Decides, once per mount, whether to offer a previously saved wizard draft.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use trip_domain::{TripWizardDraft, WizardStep};

use crate::{codec::DraftStore, time::Clock, CoreError};

pub const DEFAULT_RECENT_DRAFT_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftFreshness {
    /// Saved within the recent window.
    Recent,
    Stale,
}

/// Display flags and copy derived from a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSummary {
    pub step: WizardStep,
    pub completed_steps: usize,
    pub has_trip_type: bool,
    pub has_locations: bool,
    pub has_dates: bool,
    pub has_transportation: bool,
    pub has_lodging: bool,
    pub has_intentions: bool,
    pub has_special_needs: bool,
    pub route_label: Option<String>,
    pub age: String,
}

impl DraftSummary {
    pub fn progress_percent(&self) -> u8 {
        let done = self.completed_steps.min(usize::from(WizardStep::COUNT));
        (done * 100 / usize::from(WizardStep::COUNT)) as u8
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryPrompt {
    pub draft: TripWizardDraft,
    pub freshness: DraftFreshness,
    pub title: String,
    pub message: String,
    pub summary: DraftSummary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryDecision {
    NoDraft,
    /// A draft without meaningful progress was cleared silently.
    Discarded,
    Offer(RecoveryPrompt),
}

/// Relative age for display copy, e.g. `"12 minutes ago"`.
pub fn format_age(age: Duration) -> String {
    let minutes = age.num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    let (amount, unit) = if minutes < 60 {
        (minutes, "minute")
    } else if age.num_hours() < 24 {
        (age.num_hours(), "hour")
    } else {
        (age.num_days(), "day")
    };
    let plural = if amount == 1 { "" } else { "s" };
    format!("{amount} {unit}{plural} ago")
}

pub fn summarize_draft(draft: &TripWizardDraft, now: DateTime<Utc>) -> DraftSummary {
    let data = &draft.data;
    let needs = &data.special_needs;
    let access = &data.accessibility;
    let route_label = data.start_location.as_ref().map(|start| {
        let from = start.main_text.clone().unwrap_or_else(|| start.description.clone());
        match &data.end_location {
            Some(end) => {
                let to = end.main_text.clone().unwrap_or_else(|| end.description.clone());
                format!("{from} to {to}")
            }
            None => from,
        }
    });
    DraftSummary {
        step: draft.step(),
        completed_steps: draft.completed_steps.len(),
        has_trip_type: data.trip_type.is_some(),
        has_locations: data.has_locations(),
        has_dates: data.has_dates(),
        has_transportation: !data.transportation.is_empty(),
        has_lodging: !data.lodging.is_empty(),
        has_intentions: !data.intentions.is_empty(),
        has_special_needs: needs != &Default::default() || access != &Default::default(),
        route_label,
        age: format_age(now - draft.last_updated),
    }
}

fn prompt_copy(freshness: DraftFreshness, summary: &DraftSummary) -> (String, String) {
    let trip = summary
        .route_label
        .as_ref()
        .map(|label| format!("your trip ({label})"))
        .unwrap_or_else(|| "a trip".to_string());
    match freshness {
        DraftFreshness::Recent => (
            "Continue where you left off?".to_string(),
            format!(
                "You were planning {trip} {}. Continue where you left off on {}.",
                summary.age,
                summary.step.title().to_lowercase()
            ),
        ),
        DraftFreshness::Stale => (
            "Start fresh or continue?".to_string(),
            format!(
                "You started planning {trip} {}. Start fresh or continue from {}?",
                summary.age,
                summary.step.title().to_lowercase()
            ),
        ),
    }
}

/// Loads the single stored draft on mount and tracks the prompt the user sees.
pub struct DraftRecoveryController {
    drafts: DraftStore,
    clock: Arc<dyn Clock>,
    recent_window: Duration,
    decision: Option<RecoveryDecision>,
    prompt_visible: bool,
}

impl DraftRecoveryController {
    pub fn new(drafts: DraftStore, clock: Arc<dyn Clock>) -> Self {
        Self::with_recent_window(drafts, clock, Duration::minutes(DEFAULT_RECENT_DRAFT_MINUTES))
    }

    pub fn with_recent_window(
        drafts: DraftStore,
        clock: Arc<dyn Clock>,
        recent_window: Duration,
    ) -> Self {
        Self {
            drafts,
            clock,
            recent_window,
            decision: None,
            prompt_visible: false,
        }
    }

    /// Evaluates the stored draft. Only the first call reads storage.
    pub fn check(&mut self) -> &RecoveryDecision {
        if self.decision.is_none() {
            let decision = self.evaluate();
            self.prompt_visible = matches!(decision, RecoveryDecision::Offer(_));
            self.decision = Some(decision);
        }
        self.decision.get_or_insert(RecoveryDecision::NoDraft)
    }

    pub fn decision(&self) -> Option<&RecoveryDecision> {
        self.decision.as_ref()
    }

    /// The prompt currently shown, if any.
    pub fn prompt(&self) -> Option<&RecoveryPrompt> {
        match &self.decision {
            Some(RecoveryDecision::Offer(prompt)) if self.prompt_visible => Some(prompt),
            _ => None,
        }
    }

    pub fn is_prompt_visible(&self) -> bool {
        self.prompt().is_some()
    }

    /// Hides the prompt and hands the draft to the caller. Storage is left intact.
    pub fn accept(&mut self) -> Option<TripWizardDraft> {
        let draft = self.prompt().map(|prompt| prompt.draft.clone())?;
        tracing::info!(draft_id = %draft.id, "wizard draft resumed");
        self.prompt_visible = false;
        Some(draft)
    }

    /// Hides the prompt and deletes the stored draft.
    pub fn reject(&mut self) -> Result<(), CoreError> {
        self.prompt_visible = false;
        self.drafts.clear()?;
        tracing::info!("wizard draft discarded by user");
        Ok(())
    }

    /// Hides the prompt without touching storage.
    pub fn dismiss(&mut self) {
        self.prompt_visible = false;
    }

    fn evaluate(&self) -> RecoveryDecision {
        let now = self.clock.now();
        let draft = match self.drafts.load(now) {
            Ok(Some(draft)) => draft,
            Ok(None) => return RecoveryDecision::NoDraft,
            Err(err) => {
                tracing::warn!(error = %err, "discarding unreadable wizard draft");
                if let Err(err) = self.drafts.clear() {
                    tracing::warn!(error = %err, "failed to clear unreadable wizard draft");
                }
                return RecoveryDecision::NoDraft;
            }
        };
        if !draft.has_meaningful_progress() {
            tracing::debug!(draft_id = %draft.id, "clearing empty wizard draft");
            if let Err(err) = self.drafts.clear() {
                tracing::warn!(error = %err, "failed to clear empty wizard draft");
            }
            return RecoveryDecision::Discarded;
        }
        let freshness = if now - draft.last_updated <= self.recent_window {
            DraftFreshness::Recent
        } else {
            DraftFreshness::Stale
        };
        let summary = summarize_draft(&draft, now);
        let (title, message) = prompt_copy(freshness, &summary);
        tracing::info!(draft_id = %draft.id, ?freshness, "offering wizard draft recovery");
        RecoveryDecision::Offer(RecoveryPrompt {
            draft,
            freshness,
            title,
            message,
            summary,
        })
    }
}
