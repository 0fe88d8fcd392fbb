//! In-memory registrant directory

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tanda_core::registrant::{DirectoryError, DirectoryFuture, RegistrantDirectory};
use tanda_core::types::{Category, Gender, LevelId, Participant};

/// Registrant directory seeded by the test.
///
/// Lookups filter by level and category, and by gender when one is given.
/// Results keep registration order.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRegistrantDirectory {
    participants: Arc<RwLock<Vec<Participant>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryRegistrantDirectory {
    /// Create an empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory holding `participants`, in that order
    #[must_use]
    pub fn with_participants(participants: Vec<Participant>) -> Self {
        let directory = Self::new();
        directory.register_all(participants);
        directory
    }

    /// Register one participant
    pub fn register(&self, participant: Participant) {
        self.participants.write().unwrap().push(participant);
    }

    /// Register several participants, keeping their order
    pub fn register_all(&self, participants: impl IntoIterator<Item = Participant>) {
        self.participants.write().unwrap().extend(participants);
    }

    /// Make every lookup fail with [`DirectoryError::Unavailable`]
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of registered participants
    #[must_use]
    pub fn len(&self) -> usize {
        self.participants.read().unwrap().len()
    }

    /// Whether nobody is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.participants.read().unwrap().is_empty()
    }
}

impl RegistrantDirectory for InMemoryRegistrantDirectory {
    fn participants_by_cell(
        &self,
        level: LevelId,
        category: Category,
        gender: Option<Gender>,
    ) -> DirectoryFuture<'_, Vec<Participant>> {
        Box::pin(async move {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(DirectoryError::Unavailable("injected directory failure".to_string()));
            }
            Ok(self
                .participants
                .read()
                .unwrap()
                .iter()
                .filter(|participant| participant.level == level && participant.category == category)
                .filter(|participant| gender.is_none() || participant.gender == gender)
                .cloned()
                .collect())
        })
    }
}
