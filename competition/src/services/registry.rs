//! Live competition registry: per-cell documents, stage layouts and status.

use crate::repository::CompetitionRepository;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tanda_core::environment::Clock;
use tanda_core::error::CompetitionError;
use tanda_core::live::LiveCompetition;
use tanda_core::stage::LevelConfig;
use tanda_core::status::CompetitionStatus;
use tanda_core::types::{Cell, EventId, LiveCompetitionId, Phase, ScheduleItem};
use tracing::{info, instrument};

/// One row of the event overview
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellOverview {
    /// Live competition key
    pub id: LiveCompetitionId,
    /// The cell
    pub cell: Cell,
    /// Derived lifecycle state
    pub status: CompetitionStatus,
    /// Round the counters refer to
    pub phase: Option<Phase>,
    /// Heats judged in that round
    pub completed_tandas: u32,
    /// Heats in that round
    pub total_tandas: u32,
    /// The cell holds the event's active pointer
    pub is_current: bool,
}

/// Creates, configures and reports on live competitions
pub struct LiveCompetitionRegistry {
    repository: CompetitionRepository,
    clock: Arc<dyn Clock>,
}

impl LiveCompetitionRegistry {
    /// Create a registry
    #[must_use]
    pub fn new(repository: CompetitionRepository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    /// Ensure the cell's document exists, creating it `pending` if absent.
    ///
    /// Idempotent: an existing document is returned untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the store fails.
    #[instrument(skip(self, cell), fields(cell = %cell))]
    pub async fn start(&self, event_id: &EventId, cell: &Cell) -> Result<LiveCompetition, CompetitionError> {
        if let Some(live) = self.repository.load_live(event_id, &cell.id()).await? {
            return Ok(live);
        }

        let live = LiveCompetition::for_cell(cell, self.clock.now());
        self.repository.save_live(event_id, &live).await?;
        info!(%event_id, cell = %live.id, "Live competition started");
        Ok(live)
    }

    /// Save a stage layout for the cell (`pending → ready`).
    ///
    /// The layout is checked before anything is read or written.
    ///
    /// # Errors
    ///
    /// - [`CompetitionError::Validation`] if the layout is out of bounds.
    /// - [`CompetitionError::Conflict`] if the cell already has heats.
    /// - [`CompetitionError::Persistence`] if the store fails.
    #[instrument(skip(self, cell, config), fields(cell = %cell, blocks = config.blocks, tracks = config.tracks_per_block))]
    pub async fn configure(
        &self,
        event_id: &EventId,
        cell: &Cell,
        config: LevelConfig,
    ) -> Result<LiveCompetition, CompetitionError> {
        config.validate()?;

        let now = self.clock.now();
        let mut live = self
            .repository
            .load_live(event_id, &cell.id())
            .await?
            .unwrap_or_else(|| LiveCompetition::for_cell(cell, now));
        live.configure(config, now)?;
        self.repository.save_live(event_id, &live).await?;

        info!(%event_id, cell = %live.id, status = %live.status(), "Live competition configured");
        Ok(live)
    }

    /// Load the cell's document.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::NotFound`] if the cell was never started.
    pub async fn load(&self, event_id: &EventId, cell: &LiveCompetitionId) -> Result<LiveCompetition, CompetitionError> {
        self.repository.require_live(event_id, cell).await
    }

    /// Derived status of the cell; a cell never started is `pending`.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the store fails.
    pub async fn status(&self, event_id: &EventId, cell: &LiveCompetitionId) -> Result<CompetitionStatus, CompetitionError> {
        Ok(self
            .repository
            .load_live(event_id, cell)
            .await?
            .map_or(CompetitionStatus::Pending, |live| live.status()))
    }

    /// Recount judged heats of the current round and persist the count.
    ///
    /// Tanda completion is written by the judging subsystem; this only reads it.
    ///
    /// # Errors
    ///
    /// - [`CompetitionError::NotFound`] if the cell was never started.
    /// - [`CompetitionError::Persistence`] if the store fails.
    #[instrument(skip(self, cell), fields(cell = %cell))]
    pub async fn refresh_progress(
        &self,
        event_id: &EventId,
        cell: &LiveCompetitionId,
    ) -> Result<LiveCompetition, CompetitionError> {
        let mut live = self.repository.require_live(event_id, cell).await?;
        let Some(phase) = live.current_phase() else {
            return Ok(live);
        };

        let tandas = self.repository.tandas_for(event_id, cell, phase).await?;
        let completed = tandas.iter().filter(|tanda| tanda.is_completed()).count();
        let completed = u32::try_from(completed).unwrap_or(u32::MAX);
        if completed == live.completed_tandas {
            return Ok(live);
        }

        live.record_progress(completed, self.clock.now());
        self.repository.save_live(event_id, &live).await?;
        info!(
            %event_id,
            cell = %live.id,
            %phase,
            completed = live.completed_tandas,
            total = live.total_tandas,
            status = %live.status(),
            "Progress refreshed"
        );
        Ok(live)
    }

    /// Status of every cell of the running order, in running order.
    ///
    /// Each cell appears once, at its first row.
    ///
    /// # Errors
    ///
    /// - [`CompetitionError::NotFound`] if the event does not exist.
    /// - [`CompetitionError::Persistence`] if the store fails.
    #[instrument(skip(self))]
    pub async fn overview(&self, event_id: &EventId) -> Result<Vec<CellOverview>, CompetitionError> {
        let event = self.repository.require_event(event_id).await?;
        let documents: HashMap<LiveCompetitionId, LiveCompetition> = self
            .repository
            .list_live(event_id)
            .await?
            .into_iter()
            .map(|live| (live.id.clone(), live))
            .collect();

        let mut seen = HashSet::new();
        let rows = event
            .schedule
            .iter()
            .map(ScheduleItem::cell)
            .filter(|cell| seen.insert(cell.id()))
            .map(|cell| {
                let id = cell.id();
                let is_current = event.current_live_competition_id.as_ref() == Some(&id);
                match documents.get(&id) {
                    Some(live) => CellOverview {
                        status: live.status(),
                        phase: live.current_phase(),
                        completed_tandas: live.completed_tandas,
                        total_tandas: live.total_tandas,
                        id,
                        cell,
                        is_current,
                    },
                    None => CellOverview {
                        status: CompetitionStatus::Pending,
                        phase: None,
                        completed_tandas: 0,
                        total_tandas: 0,
                        id,
                        cell,
                        is_current,
                    },
                }
            })
            .collect();
        Ok(rows)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tanda_core::types::Gender;
    use tanda_testing::fixtures::layout;
    use tanda_testing::{test_clock, InMemoryDocumentStore};

    fn registry(store: &InMemoryDocumentStore) -> LiveCompetitionRegistry {
        LiveCompetitionRegistry::new(
            CompetitionRepository::new(Arc::new(store.clone())),
            Arc::new(test_clock()),
        )
    }

    #[tokio::test]
    async fn start_is_idempotent() {
        let store = InMemoryDocumentStore::new();
        let registry = registry(&store);
        let event_id = EventId::new();
        let cell = Cell::new("Seriado", "Adulto", Gender::Mixto);

        let first = registry.start(&event_id, &cell).await.unwrap();
        let second = registry.start(&event_id, &cell).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
        assert_eq!(first.status(), CompetitionStatus::Pending);
    }

    #[tokio::test]
    async fn configure_moves_to_ready() {
        let store = InMemoryDocumentStore::new();
        let registry = registry(&store);
        let event_id = EventId::new();
        let cell = Cell::new("Seriado", "Adulto", Gender::Mixto);

        let live = registry.configure(&event_id, &cell, layout(2, 3, 2)).await.unwrap();

        assert_eq!(live.status(), CompetitionStatus::Ready);
        assert_eq!(registry.status(&event_id, &cell.id()).await.unwrap(), CompetitionStatus::Ready);
    }

    #[tokio::test]
    async fn invalid_layout_writes_nothing() {
        let store = InMemoryDocumentStore::new();
        let registry = registry(&store);
        let bad = LevelConfig {
            blocks: 1,
            tracks_per_block: 7,
            judges_count: 1,
            notes: String::new(),
        };

        let result = registry
            .configure(&EventId::new(), &Cell::new("Seriado", "Adulto", Gender::Mixto), bad)
            .await;

        assert!(matches!(result, Err(CompetitionError::Validation(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn unknown_cell_is_pending_but_not_loadable() {
        let store = InMemoryDocumentStore::new();
        let registry = registry(&store);
        let cell = LiveCompetitionId::from_key("Seriado_Adulto_Mixto");

        assert_eq!(registry.status(&EventId::new(), &cell).await.unwrap(), CompetitionStatus::Pending);
        assert!(matches!(
            registry.load(&EventId::new(), &cell).await,
            Err(CompetitionError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_retryable() {
        let store = InMemoryDocumentStore::new();
        store.fail_writes(true);
        let registry = registry(&store);

        let error = registry
            .configure(&EventId::new(), &Cell::new("Seriado", "Adulto", Gender::Mixto), layout(1, 4, 3))
            .await
            .unwrap_err();

        assert!(error.is_retryable());
    }
}
