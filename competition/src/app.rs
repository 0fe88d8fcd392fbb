//! The operator-facing facade.
//!
//! [`CompetitionDay`] wires the services to their collaborators and is the
//! only type a front end needs. Edits to the running order and heat
//! previews are held in the event's session until the operator saves or
//! confirms them.

use crate::config::Config;
use crate::metrics;
use crate::repository::CompetitionRepository;
use crate::services::{CellOverview, HeatConfirmationFlow, HeatGeneration, LiveCompetitionRegistry, ScheduleService};
use crate::session::{EventSession, SessionMap};
use std::sync::Arc;
use tanda_core::document_store::DocumentStore;
use tanda_core::environment::Clock;
use tanda_core::error::CompetitionError;
use tanda_core::live::LiveCompetition;
use tanda_core::registrant::RegistrantDirectory;
use tanda_core::schedule::{
    DanceConfiguration, DropPosition, EditorError, ScheduleBuilder, ScheduleEditorAction, ScheduleEditorEffect,
    ScheduleEditorState,
};
use tanda_core::stage::LevelConfig;
use tanda_core::status::CompetitionStatus;
use tanda_core::types::{Cell, EventId, LiveCompetitionId, Participant, Phase, ScheduleItem, Tanda};
use tokio::sync::Mutex;
use tracing::{error, info, instrument};

/// Competition-day engine
pub struct CompetitionDay {
    config: Config,
    registry: LiveCompetitionRegistry,
    heats: HeatConfirmationFlow,
    schedule: ScheduleService,
    sessions: SessionMap,
}

impl CompetitionDay {
    /// Wire the engine to its collaborators
    #[must_use]
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        directory: Arc<dyn RegistrantDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let repository = CompetitionRepository::new(store);

        Self {
            registry: LiveCompetitionRegistry::new(repository.clone(), Arc::clone(&clock)),
            heats: HeatConfirmationFlow::new(
                repository.clone(),
                directory,
                clock,
                config.enforce_single_active_cell,
            ),
            schedule: ScheduleService::new(repository, ScheduleBuilder::with_durations(config.durations)),
            sessions: SessionMap::new(),
            config,
        }
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    // ========================================================================
    // Running order
    // ========================================================================

    /// Replace the running order with one built from `configuration` and
    /// reset the editing session to it.
    ///
    /// Heat previews held for the event are dropped; generate again to
    /// confirm.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the write is not acknowledged.
    pub async fn rebuild_schedule(
        &self,
        event_id: &EventId,
        configuration: &DanceConfiguration,
    ) -> Result<Vec<ScheduleItem>, CompetitionError> {
        let items = self.schedule.rebuild(event_id, configuration).await?;
        if self.config.metrics_enabled {
            metrics::record_schedule_rebuilt(items.len());
        }

        let session = self
            .sessions
            .get_or_insert(*event_id, EventSession::opened(items.clone()))
            .await;
        {
            let mut session = session.lock().await;
            session.dispatch(ScheduleEditorAction::Load { items: items.clone() });
            session.forget_previews();
        }
        Ok(items)
    }

    /// Running order as currently edited
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the session has to be
    /// opened and the store fails.
    pub async fn schedule(&self, event_id: &EventId) -> Result<Vec<ScheduleItem>, CompetitionError> {
        let session = self.session(event_id).await?;
        let working = session.lock().await.editor().working.clone();
        Ok(working)
    }

    /// Snapshot of the editing session
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the session has to be
    /// opened and the store fails.
    pub async fn schedule_editor(&self, event_id: &EventId) -> Result<ScheduleEditorState, CompetitionError> {
        let session = self.session(event_id).await?;
        let editor = session.lock().await.editor().clone();
        Ok(editor)
    }

    /// Move the row at `from` to `to` in the working copy.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IndexOutOfRange`](tanda_core::ValidationError::IndexOutOfRange)
    /// if either index is outside the running order.
    pub async fn move_item(&self, event_id: &EventId, from: usize, to: usize) -> Result<Vec<ScheduleItem>, CompetitionError> {
        self.edit(event_id, ScheduleEditorAction::MoveItem { from, to }).await
    }

    /// Drop the row at `from` above or below the row at `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::IndexOutOfRange`](tanda_core::ValidationError::IndexOutOfRange)
    /// if either index is outside the running order.
    pub async fn drop_onto(
        &self,
        event_id: &EventId,
        from: usize,
        target: usize,
        position: DropPosition,
    ) -> Result<Vec<ScheduleItem>, CompetitionError> {
        self.edit(event_id, ScheduleEditorAction::DropOnto { from, target, position })
            .await
    }

    /// Hand-edit the duration of one row.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad index or a zero duration.
    pub async fn set_estimated_time(
        &self,
        event_id: &EventId,
        index: usize,
        minutes: u32,
    ) -> Result<Vec<ScheduleItem>, CompetitionError> {
        self.edit(event_id, ScheduleEditorAction::SetEstimatedTime { index, minutes })
            .await
    }

    /// Write the working copy back as one whole array.
    ///
    /// A clean session writes nothing. On failure the edits are kept and the
    /// save can be repeated.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the write is not acknowledged.
    #[instrument(skip(self))]
    pub async fn save_schedule(&self, event_id: &EventId) -> Result<Vec<ScheduleItem>, CompetitionError> {
        let session = self.session(event_id).await?;
        let mut session = session.lock().await;

        for effect in session.dispatch(ScheduleEditorAction::Save) {
            match effect {
                ScheduleEditorEffect::Persist { items } => match self.schedule.persist(event_id, &items).await {
                    Ok(()) => {
                        info!(%event_id, items = items.len(), "Running order saved");
                        session.dispatch(ScheduleEditorAction::Saved { items });
                    }
                    Err(e) => {
                        error!(%event_id, error = %e, "Running order was not saved; edits kept");
                        session.dispatch(ScheduleEditorAction::SaveFailed { error: e.to_string() });
                        return Err(e);
                    }
                },
            }
        }

        Ok(session.editor().persisted.clone())
    }

    /// Throw away unsaved edits and return the last saved running order.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the session has to be
    /// opened and the store fails.
    pub async fn discard_schedule(&self, event_id: &EventId) -> Result<Vec<ScheduleItem>, CompetitionError> {
        let session = self.session(event_id).await?;
        let mut session = session.lock().await;
        session.dispatch(ScheduleEditorAction::Discard);
        Ok(session.editor().working.clone())
    }

    async fn edit(&self, event_id: &EventId, action: ScheduleEditorAction) -> Result<Vec<ScheduleItem>, CompetitionError> {
        let session = self.session(event_id).await?;
        let mut session = session.lock().await;
        session.dispatch(action);

        if let Some(EditorError::Invalid(invalid)) = &session.editor().last_error {
            return Err(invalid.clone().into());
        }
        Ok(session.editor().working.clone())
    }

    /// Close the event's session, dropping unsaved edits and held previews.
    ///
    /// The next operation on the event reopens it from the stored running
    /// order.
    #[instrument(skip(self))]
    pub async fn close_session(&self, event_id: &EventId) {
        self.sessions.close(event_id).await;
        info!(%event_id, "Session closed");
    }

    async fn session(&self, event_id: &EventId) -> Result<Arc<Mutex<EventSession>>, CompetitionError> {
        if let Some(session) = self.sessions.get(event_id).await {
            return Ok(session);
        }
        let stored = self.schedule.load(event_id).await?;
        Ok(self
            .sessions
            .get_or_insert(*event_id, EventSession::opened(stored))
            .await)
    }

    // ========================================================================
    // Live competitions
    // ========================================================================

    /// Open the cell, creating its document `pending` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the store fails.
    pub async fn start(&self, event_id: &EventId, cell: &Cell) -> Result<LiveCompetition, CompetitionError> {
        self.registry.start(event_id, cell).await
    }

    /// Save the cell's stage layout.
    ///
    /// # Errors
    ///
    /// See [`LiveCompetitionRegistry::configure`].
    pub async fn configure(
        &self,
        event_id: &EventId,
        cell: &Cell,
        config: LevelConfig,
    ) -> Result<LiveCompetition, CompetitionError> {
        self.registry.configure(event_id, cell, config).await
    }

    /// The cell's document.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::NotFound`] if the cell was never started.
    pub async fn live_competition(
        &self,
        event_id: &EventId,
        cell: &LiveCompetitionId,
    ) -> Result<LiveCompetition, CompetitionError> {
        self.registry.load(event_id, cell).await
    }

    /// Derived status of the cell.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the store fails.
    pub async fn status(&self, event_id: &EventId, cell: &LiveCompetitionId) -> Result<CompetitionStatus, CompetitionError> {
        self.registry.status(event_id, cell).await
    }

    /// Recount judged heats of the cell's current round.
    ///
    /// # Errors
    ///
    /// See [`LiveCompetitionRegistry::refresh_progress`].
    pub async fn refresh_progress(
        &self,
        event_id: &EventId,
        cell: &LiveCompetitionId,
    ) -> Result<LiveCompetition, CompetitionError> {
        self.registry.refresh_progress(event_id, cell).await
    }

    /// Status of every cell of the running order.
    ///
    /// # Errors
    ///
    /// See [`LiveCompetitionRegistry::overview`].
    pub async fn overview(&self, event_id: &EventId) -> Result<Vec<CellOverview>, CompetitionError> {
        self.registry.overview(event_id).await
    }

    // ========================================================================
    // Heats
    // ========================================================================

    /// Preview heats for the cell from the registrant directory.
    ///
    /// A preview is remembered so [`confirm_preview`](Self::confirm_preview)
    /// can confirm exactly what was shown.
    ///
    /// # Errors
    ///
    /// See [`HeatConfirmationFlow::generate`].
    pub async fn generate(&self, event_id: &EventId, cell: &Cell, phase: Phase) -> Result<HeatGeneration, CompetitionError> {
        let generation = self.heats.generate(event_id, cell, phase).await?;
        self.remember(event_id, cell, phase, &generation).await?;
        Ok(generation)
    }

    /// Preview heats for the cell from an explicit participant list.
    ///
    /// # Errors
    ///
    /// See [`HeatConfirmationFlow::generate_from`].
    pub async fn generate_from(
        &self,
        event_id: &EventId,
        cell: &Cell,
        phase: Phase,
        participants: &[Participant],
    ) -> Result<HeatGeneration, CompetitionError> {
        let generation = self.heats.generate_from(event_id, cell, phase, participants).await?;
        self.remember(event_id, cell, phase, &generation).await?;
        Ok(generation)
    }

    /// Confirm `tandas` as the heats of the cell's round.
    ///
    /// # Errors
    ///
    /// See [`HeatConfirmationFlow::confirm`].
    pub async fn confirm(
        &self,
        event_id: &EventId,
        cell: &Cell,
        phase: Phase,
        tandas: Vec<Tanda>,
    ) -> Result<LiveCompetition, CompetitionError> {
        match self.heats.confirm(event_id, cell, phase, tandas).await {
            Ok(live) => {
                if self.config.metrics_enabled {
                    metrics::record_heats_confirmed(phase, live.total_tandas);
                }
                if let Some(session) = self.sessions.get(event_id).await {
                    session.lock().await.forget_preview(&live.id, phase);
                }
                Ok(live)
            }
            Err(e) => {
                if self.config.metrics_enabled {
                    metrics::record_confirm_failure(&e);
                }
                Err(e)
            }
        }
    }

    /// Confirm the last preview generated for the cell's round.
    ///
    /// # Errors
    ///
    /// - [`CompetitionError::NotFound`] if no preview is held for (cell, phase).
    /// - Otherwise see [`HeatConfirmationFlow::confirm`]; the preview is kept
    ///   when confirmation fails.
    pub async fn confirm_preview(
        &self,
        event_id: &EventId,
        cell: &Cell,
        phase: Phase,
    ) -> Result<LiveCompetition, CompetitionError> {
        let cell_id = cell.id();
        let preview = match self.sessions.get(event_id).await {
            Some(session) => {
                let session = session.lock().await;
                session.preview(&cell_id, phase).map(<[Tanda]>::to_vec)
            }
            None => None,
        };
        let tandas = preview.ok_or_else(|| CompetitionError::not_found("heat preview", format!("{cell_id} ({phase})")))?;

        self.confirm(event_id, cell, phase, tandas).await
    }

    /// Finish the cell and release the event's active pointer.
    ///
    /// # Errors
    ///
    /// See [`HeatConfirmationFlow::finish`].
    pub async fn finish(&self, event_id: &EventId, cell: &LiveCompetitionId) -> Result<LiveCompetition, CompetitionError> {
        let live = self.heats.finish(event_id, cell).await?;
        if self.config.metrics_enabled {
            metrics::record_cell_finished();
        }
        Ok(live)
    }

    /// Persisted heats of the cell's round, ordered by number.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the store fails.
    pub async fn load_heats(
        &self,
        event_id: &EventId,
        cell: &LiveCompetitionId,
        phase: Phase,
    ) -> Result<Vec<Tanda>, CompetitionError> {
        self.heats.load_heats(event_id, cell, phase).await
    }

    async fn remember(
        &self,
        event_id: &EventId,
        cell: &Cell,
        phase: Phase,
        generation: &HeatGeneration,
    ) -> Result<(), CompetitionError> {
        let session = self.session(event_id).await?;
        let mut session = session.lock().await;
        match generation {
            HeatGeneration::Preview(tandas) => session.remember_preview(cell.id(), phase, tandas.clone()),
            HeatGeneration::Existing(_) => session.forget_preview(&cell.id(), phase),
        }
        Ok(())
    }
}

impl std::fmt::Debug for CompetitionDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompetitionDay")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
