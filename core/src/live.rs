//! The live competition document and its transitions.
//!
//! A live competition is the judged instance of one (level, category, gender)
//! cell. It is created lazily in `pending`, configured explicitly, and records
//! the heat counts written at confirmation time. Every transition here is
//! pure: the caller persists the updated document and only then treats the
//! transition as having happened.

use crate::error::{CompetitionError, ValidationError};
use crate::stage::LevelConfig;
use crate::status::{derive_status, CompetitionStatus, StatusFacts};
use crate::types::{Category, Cell, Gender, LevelId, LiveCompetitionId, Phase};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted state of one cell
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveCompetition {
    /// `${levelId}_${category}_${gender}`
    pub id: LiveCompetitionId,
    /// Level of the cell
    pub level_id: LevelId,
    /// Category of the cell
    pub category: Category,
    /// Gender split of the cell
    pub gender: Gender,
    /// Stage layout, once configured
    #[serde(default)]
    pub config: Option<LevelConfig>,
    /// Set by an explicit finish
    #[serde(default)]
    pub is_finished: bool,
    /// Heats of the current round judged so far
    #[serde(default)]
    pub completed_tandas: u32,
    /// Heats of the current round
    #[serde(default)]
    pub total_tandas: u32,
    /// Rounds whose heats have been confirmed, in confirmation order
    #[serde(default)]
    pub confirmed_phases: Vec<Phase>,
    /// When the document was created
    pub created_at: DateTime<Utc>,
    /// Last persisted change
    pub updated_at: DateTime<Utc>,
    /// When the cell was finished explicitly
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl LiveCompetition {
    /// A fresh, unconfigured document for a cell
    #[must_use]
    pub fn pending(level_id: LevelId, category: Category, gender: Gender, now: DateTime<Utc>) -> Self {
        Self {
            id: LiveCompetitionId::for_cell(&level_id, &category, gender),
            level_id,
            category,
            gender,
            config: None,
            is_finished: false,
            completed_tandas: 0,
            total_tandas: 0,
            confirmed_phases: Vec::new(),
            created_at: now,
            updated_at: now,
            finished_at: None,
        }
    }

    /// A fresh document for `cell`
    #[must_use]
    pub fn for_cell(cell: &Cell, now: DateTime<Utc>) -> Self {
        Self::pending(cell.level_id.clone(), cell.category.clone(), cell.gender, now)
    }

    /// The cell this document tracks
    #[must_use]
    pub fn cell(&self) -> Cell {
        Cell {
            level_id: self.level_id.clone(),
            category: self.category.clone(),
            gender: self.gender,
        }
    }

    /// Whether a stage layout has been saved
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Whether any heats have been confirmed
    #[must_use]
    pub fn has_heats(&self) -> bool {
        self.total_tandas > 0 || !self.confirmed_phases.is_empty()
    }

    /// Whether heats have been confirmed for `phase`
    #[must_use]
    pub fn has_heats_for(&self, phase: Phase) -> bool {
        self.confirmed_phases.contains(&phase)
    }

    /// Round the heat counters refer to
    #[must_use]
    pub fn current_phase(&self) -> Option<Phase> {
        self.confirmed_phases.last().copied()
    }

    /// Facts the status is derived from
    #[must_use]
    pub fn facts(&self) -> StatusFacts {
        StatusFacts {
            is_configured: self.is_configured(),
            has_heats: self.has_heats(),
            completed_tandas: self.completed_tandas,
            total_tandas: self.total_tandas,
            is_finished: self.is_finished,
        }
    }

    /// Derived lifecycle state
    #[must_use]
    pub fn status(&self) -> CompetitionStatus {
        derive_status(&self.facts())
    }

    /// Whether the cell is `completed`, either finished or fully judged.
    ///
    /// A closed cell accepts no further heats.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status() == CompetitionStatus::Completed
    }

    /// Save a stage layout (`pending → ready`)
    ///
    /// # Errors
    ///
    /// - [`ValidationError`] if the layout is out of bounds; the document is unchanged.
    /// - [`CompetitionError::Conflict`] if heats already exist, since they were
    ///   packed for the current layout.
    pub fn configure(&mut self, config: LevelConfig, now: DateTime<Utc>) -> Result<(), CompetitionError> {
        config.validate()?;
        if self.has_heats() {
            return Err(CompetitionError::Conflict(format!(
                "live competition {} already has heats; its stage layout is fixed",
                self.id
            )));
        }
        self.config = Some(config);
        self.updated_at = now;
        Ok(())
    }

    /// Record a confirmed heat set for `phase` (`ready → in-progress`)
    ///
    /// The counters always describe the most recently confirmed round.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::NotConfigured`] if no layout was saved.
    /// - [`CompetitionError::Conflict`] if the cell is already completed;
    ///   a completed cell never goes back to `in-progress`.
    pub fn record_heats(&mut self, phase: Phase, total: u32, now: DateTime<Utc>) -> Result<(), CompetitionError> {
        if !self.is_configured() {
            return Err(ValidationError::NotConfigured(self.id.clone()).into());
        }
        if self.is_closed() {
            return Err(CompetitionError::Conflict(format!(
                "live competition {} is completed; no more heats can be confirmed",
                self.id
            )));
        }
        if !self.has_heats_for(phase) {
            self.confirmed_phases.push(phase);
        }
        self.total_tandas = total;
        self.completed_tandas = 0;
        self.updated_at = now;
        Ok(())
    }

    /// Record how many heats the judges have completed, clamped to the total
    pub fn record_progress(&mut self, completed: u32, now: DateTime<Utc>) {
        self.completed_tandas = completed.min(self.total_tandas);
        self.updated_at = now;
    }

    /// Finish the cell explicitly (`→ completed`)
    ///
    /// Finishing twice keeps the first `finishedAt`.
    pub fn finish(&mut self, now: DateTime<Utc>) {
        self.is_finished = true;
        if self.finished_at.is_none() {
            self.finished_at = Some(now);
        }
        self.updated_at = now;
    }
}
