//! Error taxonomy of the scheduling engine.
//!
//! - [`ValidationError`]: the request is malformed or out of bounds; nothing
//!   was written and the state transition is blocked.
//! - [`CompetitionError::NotFound`]: a document the operation needs is missing.
//! - [`CompetitionError::Persistence`] / [`CompetitionError::Directory`]: a
//!   collaborator failed; derived state is unchanged and the operator may
//!   repeat the action.
//! - [`CompetitionError::Conflict`]: heats already exist (or another cell is
//!   active when the single-active guard is on).

use crate::document_store::DocumentStoreError;
use crate::registrant::DirectoryError;
use crate::types::{LiveCompetitionId, ParticipantId, Phase, TandaId};
use thiserror::Error;

/// Rejected input. Returned synchronously; never leaves partial writes behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// `blocks` outside `1..=4`
    #[error("blocks must be between 1 and {max} (got {got})")]
    BlocksOutOfRange {
        /// Requested value
        got: u8,
        /// Upper bound
        max: u8,
    },

    /// `tracksPerBlock` outside the bound allowed for the block count
    #[error("tracks per block must be between 1 and {max} when blocks = {blocks} (got {got})")]
    TracksOutOfRange {
        /// Requested value
        got: u8,
        /// Upper bound for this block count
        max: u8,
        /// Block count the bound depends on
        blocks: u8,
    },

    /// `judgesCount` outside the bound allowed for the layout
    #[error("judges count must be between 1 and {max} (got {got})")]
    JudgesOutOfRange {
        /// Requested value
        got: u8,
        /// Upper bound for this layout
        max: u8,
    },

    /// The cell has no stage layout yet
    #[error("live competition {0} is not configured")]
    NotConfigured(LiveCompetitionId),

    /// The registrant directory returned nobody for the cell
    #[error("no participants registered for {cell} ({phase})")]
    NoParticipants {
        /// Cell being generated
        cell: LiveCompetitionId,
        /// Round being generated
        phase: Phase,
    },

    /// A confirm request carried no heats
    #[error("no tandas to confirm for {cell} ({phase})")]
    NoTandas {
        /// Cell being confirmed
        cell: LiveCompetitionId,
        /// Round being confirmed
        phase: Phase,
    },

    /// A heat does not fit the configured stage layout
    #[error("tanda {tanda} does not fit the stage: {reason}")]
    TandaOverCapacity {
        /// Offending heat
        tanda: TandaId,
        /// What exceeded the layout
        reason: String,
    },

    /// A heat belongs to another cell or round than the one being confirmed
    #[error("tanda {tanda} does not belong to {cell} ({phase})")]
    ForeignTanda {
        /// Offending heat
        tanda: TandaId,
        /// Cell being confirmed
        cell: LiveCompetitionId,
        /// Round being confirmed
        phase: Phase,
    },

    /// Heats are not numbered `1..=N` in order
    #[error("tanda {tanda} is numbered {got}, expected {expected}")]
    TandaNumbering {
        /// Offending heat
        tanda: TandaId,
        /// Number at this position
        expected: u32,
        /// Number carried by the heat
        got: u32,
    },

    /// A heat identifier that does not match its cell, round and number
    #[error("tanda {tanda} should be identified as {expected}")]
    TandaIdMismatch {
        /// Identifier carried by the heat
        tanda: TandaId,
        /// Identifier derived from cell, round and number
        expected: TandaId,
    },

    /// A heat with no participants, or a block with no tracks
    #[error("tanda {tanda} has an empty {what}")]
    EmptyHeat {
        /// Offending heat
        tanda: TandaId,
        /// `heat` or `block {n}`
        what: String,
    },

    /// The same participant appears twice in one heat set
    #[error("participant {0} appears more than once")]
    DuplicateParticipant(ParticipantId),

    /// A schedule index outside the running order
    #[error("index {index} is out of range for a schedule of {len} items")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Schedule length
        len: usize,
    },

    /// A hand-edited duration of zero minutes
    #[error("estimated time must be at least one minute")]
    InvalidEstimatedTime,
}

/// Errors returned by engine operations
#[derive(Error, Debug)]
pub enum CompetitionError {
    /// The request was rejected before any write
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A required document does not exist
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of document (`event`, `live competition`)
        kind: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The document store failed; nothing was committed
    #[error("Persistence error: {0}")]
    Persistence(#[from] DocumentStoreError),

    /// The registrant directory failed
    #[error("Registrant directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Heats already exist, or another cell holds the floor
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl CompetitionError {
    /// Shorthand for a missing document
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Whether repeating the same action may succeed
    ///
    /// Collaborator failures are retryable; rejected input and conflicts are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Directory(_))
    }
}
