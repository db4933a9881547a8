//! Debounced persistence of the trip wizard draft.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use trip_domain::TripWizardDraft;
use uuid::Uuid;

use crate::{
    codec::{DraftSnapshot, DraftStore},
    debounce::DebounceSlot,
    time::Clock,
    CoreError,
};

pub const DEFAULT_AUTOSAVE_DELAY_MS: i64 = 800;

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The draft was written under `id`.
    Saved { id: Uuid, at: DateTime<Utc> },
    /// Identical to the last written snapshot; nothing was written.
    Unchanged,
}

/// Debounces draft writes and keeps one draft identity across saves.
pub struct AutoSaveController {
    drafts: DraftStore,
    clock: Arc<dyn Clock>,
    slot: DebounceSlot<DraftSnapshot>,
    last_snapshot: Option<String>,
    draft_id: Option<Uuid>,
    last_saved_at: Option<DateTime<Utc>>,
    active: bool,
}

impl AutoSaveController {
    pub fn new(drafts: DraftStore, clock: Arc<dyn Clock>) -> Self {
        Self::with_delay(drafts, clock, Duration::milliseconds(DEFAULT_AUTOSAVE_DELAY_MS))
    }

    pub fn with_delay(drafts: DraftStore, clock: Arc<dyn Clock>, delay: Duration) -> Self {
        Self {
            drafts,
            clock,
            slot: DebounceSlot::new(delay),
            last_snapshot: None,
            draft_id: None,
            last_saved_at: None,
            active: true,
        }
    }

    /// Records a change and (re)arms the debounce timer.
    pub fn schedule(&mut self, snapshot: DraftSnapshot) {
        if !self.active {
            tracing::debug!("auto-save stopped, ignoring change");
            return;
        }
        self.slot.arm(self.clock.now(), snapshot);
    }

    /// Writes the pending snapshot once its debounce window has elapsed.
    pub fn tick(&mut self) -> Result<Option<SaveOutcome>, CoreError> {
        match self.slot.take_due(self.clock.now()) {
            Some(snapshot) => self.persist(&snapshot).map(Some),
            None => Ok(None),
        }
    }

    /// Writes immediately, dropping any pending debounced write.
    pub fn force_save(&mut self, snapshot: DraftSnapshot) -> Result<SaveOutcome, CoreError> {
        self.slot.cancel();
        self.persist(&snapshot)
    }

    /// Writes the pending snapshot now, if there is one.
    pub fn flush(&mut self) -> Result<Option<SaveOutcome>, CoreError> {
        match self.slot.cancel() {
            Some(snapshot) => self.persist(&snapshot).map(Some),
            None => Ok(None),
        }
    }

    /// Continues updating an existing draft instead of minting a new one.
    pub fn set_draft_id(&mut self, id: Uuid) {
        self.draft_id = Some(id);
    }

    /// Adopts a recovered draft: its id, and its contents as the last written snapshot.
    pub fn adopt(&mut self, draft: &TripWizardDraft) -> Result<(), CoreError> {
        self.set_draft_id(draft.id);
        self.last_snapshot = Some(DraftSnapshot::from_draft(draft).canonical()?);
        self.last_saved_at = Some(draft.last_updated);
        Ok(())
    }

    pub fn draft_id(&self) -> Option<Uuid> {
        self.draft_id
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.last_saved_at
    }

    pub fn has_pending(&self) -> bool {
        self.slot.is_armed()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Forgets the draft identity, e.g. after the user starts fresh.
    pub fn reset(&mut self) {
        self.slot.cancel();
        self.draft_id = None;
        self.last_snapshot = None;
        self.last_saved_at = None;
    }

    /// Cancels the pending timer and stops accepting changes.
    pub fn shutdown(&mut self) {
        if self.slot.cancel().is_some() {
            tracing::debug!("auto-save shut down with a pending write");
        }
        self.active = false;
    }

    fn persist(&mut self, snapshot: &DraftSnapshot) -> Result<SaveOutcome, CoreError> {
        let canonical = snapshot.canonical()?;
        if self.last_snapshot.as_deref() == Some(canonical.as_str()) {
            tracing::debug!("draft unchanged since last save");
            return Ok(SaveOutcome::Unchanged);
        }
        let now = self.clock.now();
        let draft = self.drafts.save(self.draft_id, snapshot, now)?;
        tracing::info!(draft_id = %draft.id, step = draft.current_step, "wizard draft saved");
        self.draft_id = Some(draft.id);
        self.last_snapshot = Some(canonical);
        self.last_saved_at = Some(now);
        Ok(SaveOutcome::Saved {
            id: draft.id,
            at: now,
        })
    }
}
