//! Builders for test data

use tanda_core::stage::LevelConfig;
use tanda_core::types::{
    AcademyId, Category, Gender, LevelId, Participant, ParticipantId, Phase, UserId,
};

/// Builder for a [`Participant`] with fresh identifiers.
///
/// Defaults to the `Final` phase and no recorded gender.
#[derive(Clone, Debug)]
pub struct ParticipantBuilder {
    level: LevelId,
    category: Category,
    phase: Phase,
    gender: Option<Gender>,
    academy: AcademyId,
}

impl ParticipantBuilder {
    /// Start a participant registered for `level`/`category`
    #[must_use]
    pub fn new(level: &str, category: &str) -> Self {
        Self {
            level: LevelId::new(level),
            category: Category::new(category),
            phase: Phase::Final,
            gender: None,
            academy: AcademyId::new(),
        }
    }

    /// Round the participant is in
    #[must_use]
    pub const fn phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Recorded gender
    #[must_use]
    pub const fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Academy the participant dances for
    #[must_use]
    pub const fn academy(mut self, academy: AcademyId) -> Self {
        self.academy = academy;
        self
    }

    /// Build the participant
    #[must_use]
    pub fn build(self) -> Participant {
        Participant {
            id: ParticipantId::new(),
            users_id: UserId::new(),
            academies_id: self.academy,
            level: self.level,
            category: self.category,
            phase: self.phase,
            gender: self.gender,
        }
    }
}

/// `count` participants registered for the same cell and phase
#[must_use]
pub fn participants(level: &str, category: &str, phase: Phase, count: usize) -> Vec<Participant> {
    (0..count)
        .map(|_| ParticipantBuilder::new(level, category).phase(phase).build())
        .collect()
}

/// A valid stage layout
///
/// # Panics
///
/// Panics if the layout is out of bounds; only use with known-good values.
#[must_use]
#[allow(clippy::expect_used)]
pub fn layout(blocks: u8, tracks_per_block: u8, judges_count: u8) -> LevelConfig {
    LevelConfig::new(blocks, tracks_per_block, judges_count, "").expect("fixture layout should be valid")
}
