//! Heat confirmation flow: preview, confirm, finish.
//!
//! ```text
//! generate ──► Preview(tandas)   nothing persisted (besides the lazy pending doc)
//!          └─► Existing(tandas)  heats were already confirmed for (cell, phase)
//!
//! confirm  ──► one batch: live competition + every tanda + event pointer
//! finish   ──► one batch: finished live competition + event completed set
//! ```
//!
//! Every precondition of `confirm` is checked before the batch is built, so
//! a rejected or failed confirmation leaves the cell `ready` with zero tandas.

use crate::repository::CompetitionRepository;
use std::sync::Arc;
use tanda_core::environment::Clock;
use tanda_core::error::{CompetitionError, ValidationError};
use tanda_core::live::LiveCompetition;
use tanda_core::partition::{partition, validate_heats};
use tanda_core::registrant::RegistrantDirectory;
use tanda_core::stage::{LevelConfig, StageLayout};
use tanda_core::types::{Cell, EventId, LiveCompetitionId, Participant, Phase, Tanda};
use tracing::{debug, error, info, instrument, warn};

/// Outcome of heat generation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeatGeneration {
    /// Freshly partitioned heats, not persisted
    Preview(Vec<Tanda>),
    /// Heats already confirmed for this cell and round, loaded from the store
    Existing(Vec<Tanda>),
}

impl HeatGeneration {
    /// The heats, whichever branch produced them
    #[must_use]
    pub fn tandas(&self) -> &[Tanda] {
        match self {
            Self::Preview(tandas) | Self::Existing(tandas) => tandas,
        }
    }

    /// Consume into the heats
    #[must_use]
    pub fn into_tandas(self) -> Vec<Tanda> {
        match self {
            Self::Preview(tandas) | Self::Existing(tandas) => tandas,
        }
    }

    /// Whether these heats still need confirming
    #[must_use]
    pub const fn is_preview(&self) -> bool {
        matches!(self, Self::Preview(_))
    }
}

/// Orchestrates preview → confirm → persist for one cell at a time
pub struct HeatConfirmationFlow {
    repository: CompetitionRepository,
    directory: Arc<dyn RegistrantDirectory>,
    clock: Arc<dyn Clock>,
    enforce_single_active_cell: bool,
}

impl HeatConfirmationFlow {
    /// Create the flow
    #[must_use]
    pub fn new(
        repository: CompetitionRepository,
        directory: Arc<dyn RegistrantDirectory>,
        clock: Arc<dyn Clock>,
        enforce_single_active_cell: bool,
    ) -> Self {
        Self {
            repository,
            directory,
            clock,
            enforce_single_active_cell,
        }
    }

    // ========================================================================
    // Generation
    // ========================================================================

    /// Generate heats for `phase` of `cell` from the registrant directory.
    ///
    /// Only registrants currently in `phase` are partitioned.
    ///
    /// # Errors
    ///
    /// See [`generate_from`](Self::generate_from); additionally
    /// [`CompetitionError::Directory`] if the directory fails.
    #[instrument(skip(self, cell), fields(cell = %cell))]
    pub async fn generate(&self, event_id: &EventId, cell: &Cell, phase: Phase) -> Result<HeatGeneration, CompetitionError> {
        let live = self.ensure_started(event_id, cell).await?;
        if let Some(existing) = self.existing_heats(event_id, &live.id, phase).await? {
            return Ok(existing);
        }
        let config = live
            .config
            .as_ref()
            .ok_or_else(|| ValidationError::NotConfigured(live.id.clone()))?;

        let participants: Vec<Participant> = self
            .directory
            .participants_by_cell(cell.level_id.clone(), cell.category.clone(), cell.gender.directory_filter())
            .await?
            .into_iter()
            .filter(|participant| participant.phase == phase)
            .collect();

        Self::preview(&live.id, phase, &participants, config.layout())
    }

    /// Generate heats for `phase` of `cell` from an explicit participant list.
    ///
    /// The list is partitioned in the order given. The same input always
    /// yields the same preview.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::NotConfigured`] if the cell has no stage layout.
    /// - [`ValidationError::NoParticipants`] if `participants` is empty.
    /// - [`ValidationError::DuplicateParticipant`] if someone is listed twice.
    /// - [`CompetitionError::Persistence`] if the store fails.
    #[instrument(skip(self, cell, participants), fields(cell = %cell, participants = participants.len()))]
    pub async fn generate_from(
        &self,
        event_id: &EventId,
        cell: &Cell,
        phase: Phase,
        participants: &[Participant],
    ) -> Result<HeatGeneration, CompetitionError> {
        let live = self.ensure_started(event_id, cell).await?;
        if let Some(existing) = self.existing_heats(event_id, &live.id, phase).await? {
            return Ok(existing);
        }
        let config = live
            .config
            .as_ref()
            .ok_or_else(|| ValidationError::NotConfigured(live.id.clone()))?;

        Self::preview(&live.id, phase, participants, config.layout())
    }

    fn preview(
        cell: &LiveCompetitionId,
        phase: Phase,
        participants: &[Participant],
        layout: StageLayout,
    ) -> Result<HeatGeneration, CompetitionError> {
        if participants.is_empty() {
            return Err(ValidationError::NoParticipants {
                cell: cell.clone(),
                phase,
            }
            .into());
        }
        let tandas = partition(cell, phase, participants, layout)?;
        debug!(
            cell = %cell,
            %phase,
            participants = participants.len(),
            capacity = layout.capacity(),
            tandas = tandas.len(),
            "Heats previewed"
        );
        Ok(HeatGeneration::Preview(tandas))
    }

    async fn ensure_started(&self, event_id: &EventId, cell: &Cell) -> Result<LiveCompetition, CompetitionError> {
        if let Some(live) = self.repository.load_live(event_id, &cell.id()).await? {
            return Ok(live);
        }
        let live = LiveCompetition::for_cell(cell, self.clock.now());
        self.repository.save_live(event_id, &live).await?;
        info!(%event_id, cell = %live.id, "Live competition started");
        Ok(live)
    }

    async fn existing_heats(
        &self,
        event_id: &EventId,
        cell: &LiveCompetitionId,
        phase: Phase,
    ) -> Result<Option<HeatGeneration>, CompetitionError> {
        let existing = self.repository.tandas_for(event_id, cell, phase).await?;
        if existing.is_empty() {
            return Ok(None);
        }
        warn!(
            %event_id,
            cell = %cell,
            %phase,
            tandas = existing.len(),
            "Heats already confirmed; loading them instead of regenerating"
        );
        Ok(Some(HeatGeneration::Existing(existing)))
    }

    // ========================================================================
    // Confirmation
    // ========================================================================

    /// Persist `tandas` as the heats of `phase` of `cell`, and make the cell
    /// the event's active one.
    ///
    /// The live competition, every tanda and the event pointer are written in
    /// one batch: either all of them become visible or none does.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::NotConfigured`] if the cell has no stage layout.
    /// - [`ValidationError::NoTandas`], [`ValidationError::ForeignTanda`],
    ///   [`ValidationError::TandaNumbering`], [`ValidationError::TandaIdMismatch`],
    ///   [`ValidationError::EmptyHeat`], [`ValidationError::TandaOverCapacity`]
    ///   or [`ValidationError::DuplicateParticipant`] if the heats do not fit.
    /// - [`CompetitionError::Conflict`] if the cell is already completed, if
    ///   heats were already confirmed for this round, or (with the
    ///   single-active guard on) another cell is active.
    /// - [`CompetitionError::Persistence`] if the batch was not committed.
    #[instrument(skip(self, cell, tandas), fields(cell = %cell, tandas = tandas.len()))]
    pub async fn confirm(
        &self,
        event_id: &EventId,
        cell: &Cell,
        phase: Phase,
        tandas: Vec<Tanda>,
    ) -> Result<LiveCompetition, CompetitionError> {
        let now = self.clock.now();
        let cell_id = cell.id();
        let mut live = self
            .repository
            .load_live(event_id, &cell_id)
            .await?
            .unwrap_or_else(|| LiveCompetition::for_cell(cell, now));

        let layout = live
            .config
            .as_ref()
            .map(LevelConfig::layout)
            .ok_or_else(|| ValidationError::NotConfigured(cell_id.clone()))?;
        validate_heats(&cell_id, phase, &tandas, layout)?;

        if !self.repository.tandas_for(event_id, &cell_id, phase).await?.is_empty() {
            return Err(CompetitionError::Conflict(format!(
                "heats for {cell_id} ({phase}) are already confirmed"
            )));
        }

        let mut event = self.repository.load_event_or_new(event_id).await?;
        if live.is_closed() || event.is_completed(&cell_id) {
            return Err(CompetitionError::Conflict(format!(
                "{cell_id} is completed; no more heats can be confirmed"
            )));
        }
        if let Some(active) = event
            .current_live_competition_id
            .as_ref()
            .filter(|active| **active != cell_id)
        {
            if self.enforce_single_active_cell {
                return Err(CompetitionError::Conflict(format!(
                    "{active} is still on the floor; finish it before confirming {cell_id}"
                )));
            }
            warn!(%event_id, active = %active, cell = %cell_id, "Another cell is still active; taking over the floor");
        }

        let total = u32::try_from(tandas.len()).unwrap_or(u32::MAX);
        live.record_heats(phase, total, now)?;
        event.current_live_competition_id = Some(cell_id.clone());

        let batch = CompetitionRepository::confirmation_batch(&event, &live, &tandas)?;
        if let Err(e) = self.repository.commit(batch).await {
            error!(%event_id, cell = %cell_id, %phase, error = %e, "Heat confirmation was not committed");
            return Err(e);
        }

        info!(
            %event_id,
            cell = %cell_id,
            %phase,
            tandas = total,
            status = %live.status(),
            "Heats confirmed"
        );
        Ok(live)
    }

    /// Finish `cell` explicitly and release the event's active pointer.
    ///
    /// Finishing an already finished cell keeps its first `finishedAt`.
    ///
    /// # Errors
    ///
    /// - [`CompetitionError::NotFound`] if the cell was never started.
    /// - [`CompetitionError::Persistence`] if the batch was not committed.
    #[instrument(skip(self, cell), fields(cell = %cell))]
    pub async fn finish(&self, event_id: &EventId, cell: &LiveCompetitionId) -> Result<LiveCompetition, CompetitionError> {
        let mut live = self.repository.require_live(event_id, cell).await?;
        let mut event = self.repository.load_event_or_new(event_id).await?;

        live.finish(self.clock.now());
        event.mark_finished(cell);

        let batch = CompetitionRepository::finish_batch(&event, &live)?;
        if let Err(e) = self.repository.commit(batch).await {
            error!(%event_id, cell = %cell, error = %e, "Finish was not committed");
            return Err(e);
        }

        info!(
            %event_id,
            cell = %cell,
            completed_cells = event.completed_live_competitions.len(),
            "Live competition finished"
        );
        Ok(live)
    }

    /// Persisted heats of `phase` of `cell`, ordered by number.
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
        self.repository.tandas_for(event_id, cell, phase).await
    }
}
