//! Typed access to the document store.
//!
//! Every read decodes into a domain type and every write encodes one; no
//! other module touches paths or raw documents.

use std::sync::Arc;
use tanda_core::document_store::{decode, encode, paths, DocumentStore, WriteBatch};
use tanda_core::error::CompetitionError;
use tanda_core::live::LiveCompetition;
use tanda_core::types::{EventId, EventRecord, LiveCompetitionId, Phase, Tanda};

/// Document-store repository for events, live competitions and tandas
#[derive(Clone)]
pub struct CompetitionRepository {
    store: Arc<dyn DocumentStore>,
}

impl CompetitionRepository {
    /// Create a repository over `store`
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Load the event document, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the store cannot be read
    /// or the document is malformed.
    pub async fn load_event(&self, event_id: &EventId) -> Result<Option<EventRecord>, CompetitionError> {
        let document = self.store.get(paths::event(event_id)).await?;
        Ok(document.map(decode).transpose()?)
    }

    /// Load the event document, or an empty one if it was never written.
    ///
    /// # Errors
    ///
    /// See [`load_event`](Self::load_event).
    pub async fn load_event_or_new(&self, event_id: &EventId) -> Result<EventRecord, CompetitionError> {
        Ok(self
            .load_event(event_id)
            .await?
            .unwrap_or_else(|| EventRecord::new(*event_id)))
    }

    /// Load the event document.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::NotFound`] if it does not exist.
    pub async fn require_event(&self, event_id: &EventId) -> Result<EventRecord, CompetitionError> {
        self.load_event(event_id)
            .await?
            .ok_or_else(|| CompetitionError::not_found("event", event_id))
    }

    /// Replace the event document in one write.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the write is not acknowledged.
    pub async fn save_event(&self, event: &EventRecord) -> Result<(), CompetitionError> {
        self.store.set(paths::event(&event.id), encode(event)?).await?;
        Ok(())
    }

    // ========================================================================
    // Live competitions
    // ========================================================================

    /// Load one live competition, if it exists.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the store cannot be read
    /// or the document is malformed.
    pub async fn load_live(
        &self,
        event_id: &EventId,
        cell: &LiveCompetitionId,
    ) -> Result<Option<LiveCompetition>, CompetitionError> {
        let document = self.store.get(paths::live_competition(event_id, cell)).await?;
        Ok(document.map(decode).transpose()?)
    }

    /// Load one live competition.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::NotFound`] if it does not exist.
    pub async fn require_live(
        &self,
        event_id: &EventId,
        cell: &LiveCompetitionId,
    ) -> Result<LiveCompetition, CompetitionError> {
        self.load_live(event_id, cell)
            .await?
            .ok_or_else(|| CompetitionError::not_found("live competition", cell))
    }

    /// Replace one live competition document.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the write is not acknowledged.
    pub async fn save_live(&self, event_id: &EventId, live: &LiveCompetition) -> Result<(), CompetitionError> {
        self.store
            .set(paths::live_competition(event_id, &live.id), encode(live)?)
            .await?;
        Ok(())
    }

    /// Every live competition of the event, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the store cannot be read
    /// or a document is malformed.
    pub async fn list_live(&self, event_id: &EventId) -> Result<Vec<LiveCompetition>, CompetitionError> {
        let documents = self.store.list(paths::live_competitions(event_id)).await?;
        documents
            .into_iter()
            .map(|(_, document)| decode(document).map_err(CompetitionError::from))
            .collect()
    }

    // ========================================================================
    // Tandas
    // ========================================================================

    /// Persisted tandas of one round, ordered by number.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the store cannot be read
    /// or a document is malformed.
    pub async fn tandas_for(
        &self,
        event_id: &EventId,
        cell: &LiveCompetitionId,
        phase: Phase,
    ) -> Result<Vec<Tanda>, CompetitionError> {
        let documents = self.store.list(paths::tandas(event_id, cell)).await?;
        let mut tandas = documents
            .into_iter()
            .map(|(_, document)| decode::<Tanda>(document).map_err(CompetitionError::from))
            .filter(|tanda| !matches!(tanda, Ok(tanda) if tanda.phase != phase))
            .collect::<Result<Vec<_>, _>>()?;
        // Keys sort lexically ("Final_10" < "Final_2"); heats run by number.
        tandas.sort_by_key(|tanda| tanda.number);
        Ok(tandas)
    }

    /// Queue a confirmed heat set: the live competition, every tanda and the
    /// event pointer.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if a document cannot be
    /// encoded; nothing has been written at that point.
    pub fn confirmation_batch(
        event: &EventRecord,
        live: &LiveCompetition,
        tandas: &[Tanda],
    ) -> Result<WriteBatch, CompetitionError> {
        let mut batch = WriteBatch::new();
        batch.set_json(paths::live_competition(&event.id, &live.id), live)?;
        for tanda in tandas {
            batch.set_json(paths::tanda(&event.id, &live.id, &tanda.document_key()), tanda)?;
        }
        batch.set_json(paths::event(&event.id), event)?;
        Ok(batch)
    }

    /// Queue a finished cell together with the updated event document.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if a document cannot be encoded.
    pub fn finish_batch(event: &EventRecord, live: &LiveCompetition) -> Result<WriteBatch, CompetitionError> {
        let mut batch = WriteBatch::new();
        batch.set_json(paths::live_competition(&event.id, &live.id), live)?;
        batch.set_json(paths::event(&event.id), event)?;
        Ok(batch)
    }

    /// Commit a batch, all or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the batch was not committed.
    pub async fn commit(&self, batch: WriteBatch) -> Result<(), CompetitionError> {
        self.store.commit(batch).await?;
        Ok(())
    }
}

impl std::fmt::Debug for CompetitionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompetitionRepository").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tanda_core::types::{Block, Cell, Gender, TandaStatus};
    use tanda_testing::InMemoryDocumentStore;

    fn tanda(cell: &LiveCompetitionId, phase: Phase, number: u32) -> Tanda {
        Tanda {
            id: Tanda::id_for(cell, phase, number),
            live_competition_id: cell.clone(),
            phase,
            number,
            blocks: vec![Block {
                number: 1,
                tracks: Vec::new(),
            }],
            status: TandaStatus::Pending,
        }
    }

    #[tokio::test]
    async fn missing_event_is_not_found() {
        let repository = CompetitionRepository::new(Arc::new(InMemoryDocumentStore::new()));
        let result = repository.require_event(&EventId::new()).await;
        assert!(matches!(result, Err(CompetitionError::NotFound { kind: "event", .. })));
    }

    #[tokio::test]
    async fn tandas_are_ordered_by_number_and_filtered_by_phase() {
        let store = InMemoryDocumentStore::new();
        let repository = CompetitionRepository::new(Arc::new(store.clone()));
        let event = EventRecord::new(EventId::new());
        let live = LiveCompetition::for_cell(&Cell::new("Seriado", "Adulto", Gender::Mixto), Utc::now());

        let mut heats: Vec<Tanda> = (1..=11).map(|number| tanda(&live.id, Phase::Final, number)).collect();
        heats.push(tanda(&live.id, Phase::Eliminatoria, 1));
        let batch = CompetitionRepository::confirmation_batch(&event, &live, &heats).unwrap();
        repository.commit(batch).await.unwrap();

        let finals = repository.tandas_for(&event.id, &live.id, Phase::Final).await.unwrap();
        let numbers: Vec<u32> = finals.iter().map(|tanda| tanda.number).collect();
        assert_eq!(numbers, (1..=11).collect::<Vec<_>>());

        let eliminatoria = repository.tandas_for(&event.id, &live.id, Phase::Eliminatoria).await.unwrap();
        assert_eq!(eliminatoria.len(), 1);
    }

    #[test]
    fn confirmation_batch_writes_live_tandas_and_event() {
        let event = EventRecord::new(EventId::new());
        let live = LiveCompetition::for_cell(&Cell::new("Seriado", "Baby", Gender::Mixto), Utc::now());
        let heats = vec![tanda(&live.id, Phase::Final, 1), tanda(&live.id, Phase::Final, 2)];

        let batch = CompetitionRepository::confirmation_batch(&event, &live, &heats).unwrap();

        assert_eq!(batch.len(), 4);
        assert!(batch.ops()[1].path().ends_with("/tandas/Final_1"));
        assert_eq!(batch.ops()[3].path(), paths::event(&event.id));
    }

    #[tokio::test]
    async fn malformed_document_is_a_persistence_error() {
        let store = InMemoryDocumentStore::new();
        let event_id = EventId::new();
        store.insert(paths::event(&event_id), serde_json::json!({"schedule": "not a list"}));
        let repository = CompetitionRepository::new(Arc::new(store));

        let result = repository.load_event(&event_id).await;
        assert!(matches!(result, Err(CompetitionError::Persistence(_))));
    }
}
