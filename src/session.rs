use std::sync::Arc;

use trip_config::{Config, ConfigManager};
use trip_core::{
    candidate_pois, plan_trip, save_trip, Announcement, Announcer, AutoSaveController, Clock,
    DirectionsProvider, DirectionsService, DraftRecoveryController, DraftStore, ItineraryAction,
    ItineraryManager, KeyValueStore, NavOutcome, PlannedTrip, PlannerBackend, RecoveryDecision,
    RecoveryPrompt, SaveOutcome, StepNavigator, TripWizardPatch, UserNotice, WizardFormController,
};
use trip_domain::{ItineraryState, Poi, SavedTrip};
use trip_storage_json::JsonFileStore;
use uuid::Uuid;

use crate::{clock::SystemClock, errors::SessionError};

/// What a call to [`PlannerSession::tick`] delivered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionTick {
    pub saved: Option<SaveOutcome>,
    pub announcement: Option<Announcement>,
}

/// One mounted planner: the itinerary, the trip wizard, and their timers.
pub struct PlannerSession {
    config: Config,
    itinerary: ItineraryManager,
    form: WizardFormController,
    autosave: AutoSaveController,
    recovery: DraftRecoveryController,
    navigator: StepNavigator,
    open: bool,
}

impl PlannerSession {
    /// Opens a session with the saved config, on-disk records, and the system clock.
    pub fn open(config_manager: &ConfigManager) -> Result<Self, SessionError> {
        let config = config_manager.load()?;
        let store = JsonFileStore::new(config.resolve_storage_root())?;
        Self::open_with(config, Arc::new(store), Arc::new(SystemClock))
    }

    /// Hydrates the itinerary and evaluates draft recovery once.
    pub fn open_with(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let drafts = DraftStore::with_ttl(store.clone(), config.draft_ttl());
        let initial = ItineraryState::with_title(clock.today(), config.default_trip_title.clone());

        let mut itinerary = ItineraryManager::new(store, initial);
        itinerary.hydrate();

        let mut recovery = DraftRecoveryController::with_recent_window(
            drafts.clone(),
            clock.clone(),
            config.recent_draft_window(),
        );
        match recovery.check() {
            RecoveryDecision::Offer(prompt) => {
                tracing::info!(freshness = ?prompt.freshness, "draft recovery offered");
            }
            decision => tracing::debug!(?decision, "no draft to recover"),
        }

        let autosave =
            AutoSaveController::with_delay(drafts, clock.clone(), config.autosave_delay());
        let navigator = StepNavigator::new(Announcer::with_delay(
            clock.clone(),
            config.announcement_delay(),
        ));
        let form = WizardFormController::new(clock);

        Ok(Self {
            config,
            itinerary,
            form,
            autosave,
            recovery,
            navigator,
            open: true,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn itinerary(&self) -> &ItineraryState {
        self.itinerary.state()
    }

    pub fn form(&self) -> &WizardFormController {
        &self.form
    }

    pub fn navigator(&self) -> &StepNavigator {
        &self.navigator
    }

    pub fn recovery_prompt(&self) -> Option<&RecoveryPrompt> {
        self.recovery.prompt()
    }

    pub fn draft_id(&self) -> Option<Uuid> {
        self.autosave.draft_id()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn dispatch(&mut self, action: ItineraryAction) -> Result<&ItineraryState, SessionError> {
        self.ensure_open()?;
        Ok(self.itinerary.dispatch(action))
    }

    /// Applies a wizard edit and re-arms the auto-save timer.
    pub fn update_wizard(&mut self, patch: TripWizardPatch) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.form.update_step_data(patch);
        self.autosave.schedule(self.form.snapshot());
        Ok(())
    }

    /// Routes a key press to the wizard. Leaving a step saves immediately.
    pub fn handle_key(&mut self, key: &str) -> Result<NavOutcome, SessionError> {
        self.ensure_open()?;
        let outcome = self.navigator.handle_key_name(key, &mut self.form);
        match outcome {
            NavOutcome::Moved { .. } | NavOutcome::Submitted => {
                self.autosave.force_save(self.form.snapshot())?;
            }
            NavOutcome::Blocked { .. } => self.autosave.schedule(self.form.snapshot()),
            NavOutcome::Escaped | NavOutcome::Unchanged => {}
        }
        Ok(outcome)
    }

    /// Fires whichever timers are due.
    pub fn tick(&mut self) -> Result<SessionTick, SessionError> {
        if !self.open {
            return Ok(SessionTick::default());
        }
        Ok(SessionTick {
            saved: self.autosave.tick()?,
            announcement: self.navigator.tick(),
        })
    }

    /// Loads the offered draft into the wizard and keeps saving to the same record.
    pub fn accept_recovered_draft(&mut self) -> Result<bool, SessionError> {
        self.ensure_open()?;
        let Some(draft) = self.recovery.accept() else {
            return Ok(false);
        };
        self.form.restore(&draft);
        self.autosave.adopt(&draft)?;
        Ok(true)
    }

    /// Deletes the offered draft and starts the wizard from scratch.
    pub fn reject_recovered_draft(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.recovery.reject()?;
        self.autosave.reset();
        self.form.reset_form(None);
        Ok(())
    }

    pub fn dismiss_recovery(&mut self) {
        self.recovery.dismiss();
    }

    /// Configured directions wrapper around `provider`.
    pub fn directions<P: DirectionsProvider>(&self, provider: P) -> DirectionsService<P> {
        DirectionsService::new(provider)
            .with_route_points(
                self.config.route_point_target,
                self.config.route_point_dedupe_degrees,
            )
            .with_max_detour_km(self.config.max_detour_km)
    }

    /// Plans the wizard's trip and keeps only POIs worth offering.
    pub fn plan<B: PlannerBackend + ?Sized>(&self, backend: &B) -> Result<PlannedTrip, UserNotice> {
        let mut planned = plan_trip(backend, self.form.data())?;
        planned.pois = candidate_pois(
            planned.pois,
            self.itinerary.state(),
            &planned.route.route_points,
            self.config.max_detour_km,
        );
        Ok(planned)
    }

    pub fn save<B: PlannerBackend + ?Sized>(
        &self,
        backend: &B,
        planned: PlannedTrip,
        is_public: bool,
    ) -> Result<SavedTrip, UserNotice> {
        save_trip(
            backend,
            &self.itinerary.state().trip_title,
            self.form.data(),
            planned,
            is_public,
        )
    }

    /// Schedules a POI on `day_index`.
    pub fn schedule_poi(
        &mut self,
        poi: Poi,
        day_index: usize,
    ) -> Result<&ItineraryState, SessionError> {
        self.dispatch(ItineraryAction::assign(poi, day_index))
    }

    /// Flushes the wizard draft and stops every timer. Pristine forms are not written.
    pub fn close(&mut self) -> Result<(), SessionError> {
        if !self.open {
            return Ok(());
        }
        let snapshot = self.form.snapshot();
        let pristine = snapshot.current_step == 1
            && snapshot.completed_steps.is_empty()
            && !snapshot.data.has_user_input();
        if !pristine {
            self.autosave.force_save(snapshot)?;
        }
        self.autosave.shutdown();
        self.navigator.announcer_mut().cancel();
        self.open = false;
        tracing::info!(draft_id = ?self.autosave.draft_id(), "planner session closed");
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.open {
            Ok(())
        } else {
            Err(SessionError::Closed)
        }
    }
}
