//! Running-order persistence.

use crate::repository::CompetitionRepository;
use tanda_core::error::CompetitionError;
use tanda_core::schedule::{total_estimated_minutes, DanceConfiguration, ScheduleBuilder};
use tanda_core::types::{EventId, ScheduleItem};
use tracing::{info, instrument, warn};

/// Builds, loads and writes back an event's running order.
///
/// The running order is always written as one whole array inside the event
/// document, never row by row.
pub struct ScheduleService {
    repository: CompetitionRepository,
    builder: ScheduleBuilder,
}

impl ScheduleService {
    /// Create the service
    #[must_use]
    pub const fn new(repository: CompetitionRepository, builder: ScheduleBuilder) -> Self {
        Self { repository, builder }
    }

    /// Replace the running order with one built from `configuration`.
    ///
    /// A configuration without categories yields (and stores) an empty
    /// running order; that is logged, not rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the write is not acknowledged.
    #[instrument(skip(self, configuration), fields(levels = configuration.len()))]
    pub async fn rebuild(
        &self,
        event_id: &EventId,
        configuration: &DanceConfiguration,
    ) -> Result<Vec<ScheduleItem>, CompetitionError> {
        let items = self.builder.build(configuration);
        if items.is_empty() {
            warn!(%event_id, "Dance configuration has no categories; running order is empty");
        }

        self.persist(event_id, &items).await?;
        info!(
            %event_id,
            items = items.len(),
            minutes = total_estimated_minutes(&items),
            "Running order rebuilt"
        );
        Ok(items)
    }

    /// Stored running order; empty for an event never written.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the store fails.
    pub async fn load(&self, event_id: &EventId) -> Result<Vec<ScheduleItem>, CompetitionError> {
        Ok(self
            .repository
            .load_event(event_id)
            .await?
            .map(|event| event.schedule)
            .unwrap_or_default())
    }

    /// Write `items` back as the event's running order, in one write.
    ///
    /// # Errors
    ///
    /// Returns [`CompetitionError::Persistence`] if the write is not acknowledged.
    pub async fn persist(&self, event_id: &EventId, items: &[ScheduleItem]) -> Result<(), CompetitionError> {
        let mut event = self.repository.load_event_or_new(event_id).await?;
        event.schedule = items.to_vec();
        self.repository.save_event(&event).await
    }
}
