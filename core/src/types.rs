//! Domain types for the competition-day scheduling engine.
//!
//! Identifiers, the running-order row ([`ScheduleItem`]), registrants
//! ([`Participant`]), heats ([`Tanda`]) and the event document
//! ([`EventRecord`]). Field names serialize in camelCase because these types
//! are stored as documents.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random `", stringify!($name), "`")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Create a `", stringify!($name), "` from a `Uuid`")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Create a `", stringify!($name), "` from any string-like value")]
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the underlying string
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a competition event
    EventId
);
uuid_id!(
    /// Unique identifier for a row of the running order
    ScheduleItemId
);
uuid_id!(
    /// Unique identifier for a registered participant (one performing entry)
    ParticipantId
);
uuid_id!(
    /// Identifier of the user account behind a participant
    UserId
);
uuid_id!(
    /// Identifier of the academy a participant dances for
    AcademyId
);

string_id!(
    /// Competition level, e.g. `Seriado`
    LevelId
);
string_id!(
    /// Age or style category within a level, e.g. `Baby` or `Adulto`
    Category
);
string_id!(
    /// Deterministic identifier of a persisted heat
    TandaId
);

/// Key of a live competition: `${levelId}_${category}_${gender}`
///
/// The key is derived from the cell it represents, so the same cell always
/// maps to the same document within one event.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LiveCompetitionId(String);

impl LiveCompetitionId {
    /// Build the key for a (level, category, gender) cell
    #[must_use]
    pub fn for_cell(level: &LevelId, category: &Category, gender: Gender) -> Self {
        Self(format!("{level}_{category}_{gender}"))
    }

    /// Wrap an already-formatted key (as read back from the store)
    #[must_use]
    pub fn from_key(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LiveCompetitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Enumerations
// ============================================================================

/// Gender split of a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Mixed (no gender separation)
    Mixto,
    /// Women only
    Mujeres,
    /// Men only
    Varones,
}

impl Gender {
    /// Genders produced for a level, in running order
    #[must_use]
    pub const fn for_separation(separate: bool) -> &'static [Self] {
        if separate {
            &[Self::Mujeres, Self::Varones]
        } else {
            &[Self::Mixto]
        }
    }

    /// Name as stored in documents and keys
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mixto => "Mixto",
            Self::Mujeres => "Mujeres",
            Self::Varones => "Varones",
        }
    }

    /// Gender filter for the registrant directory (`None` for mixed cells)
    #[must_use]
    pub const fn directory_filter(self) -> Option<Self> {
        match self {
            Self::Mixto => None,
            other => Some(other),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Competition round
///
/// Variants are declared in competition-progression order, so the derived
/// `Ord` is the order rounds are run in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Elimination round
    Eliminatoria,
    /// Semifinal round
    Semifinal,
    /// Final round
    Final,
}

impl Phase {
    /// All phases in competition-progression order
    pub const ALL: [Self; 3] = [Self::Eliminatoria, Self::Semifinal, Self::Final];

    /// Name as stored in documents and keys
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eliminatoria => "Eliminatoria",
            Self::Semifinal => "Semifinal",
            Self::Final => "Final",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Running order
// ============================================================================

/// One row of an event's running order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    /// Row identifier
    pub id: ScheduleItemId,
    /// Level of the cell
    pub level_id: LevelId,
    /// Category of the cell
    pub category: Category,
    /// Gender split of the cell
    pub gender: Gender,
    /// Round this row runs
    pub phase: Phase,
    /// Position in the running order (contiguous `0..N`)
    pub order: u32,
    /// Estimated duration in minutes
    pub estimated_time: u32,
}

impl ScheduleItem {
    /// Key of the live competition this row belongs to
    #[must_use]
    pub fn cell_id(&self) -> LiveCompetitionId {
        LiveCompetitionId::for_cell(&self.level_id, &self.category, self.gender)
    }

    /// The (level, category, gender) cell this row belongs to
    #[must_use]
    pub fn cell(&self) -> Cell {
        Cell {
            level_id: self.level_id.clone(),
            category: self.category.clone(),
            gender: self.gender,
        }
    }
}

/// A competition cell: one level × category × gender combination.
///
/// Several running-order rows (one per phase) share a cell, and each cell
/// has at most one live competition per event.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    /// Level
    pub level_id: LevelId,
    /// Category
    pub category: Category,
    /// Gender split
    pub gender: Gender,
}

impl Cell {
    /// Creates a cell
    #[must_use]
    pub fn new(level_id: impl Into<LevelId>, category: impl Into<Category>, gender: Gender) -> Self {
        Self {
            level_id: level_id.into(),
            category: category.into(),
            gender,
        }
    }

    /// Key of the cell's live competition
    #[must_use]
    pub fn id(&self) -> LiveCompetitionId {
        LiveCompetitionId::for_cell(&self.level_id, &self.category, self.gender)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.level_id, self.category, self.gender)
    }
}

// ============================================================================
// Participants and heats
// ============================================================================

/// A registered entry, as served by the registrant directory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Entry identifier
    pub id: ParticipantId,
    /// User account behind the entry
    pub users_id: UserId,
    /// Academy the entry dances for
    pub academies_id: AcademyId,
    /// Level registered for
    pub level: LevelId,
    /// Category registered for
    pub category: Category,
    /// Round the entry is currently in
    pub phase: Phase,
    /// Gender, when the registration records one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

/// Completion status of a single heat, written by the judging subsystem
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TandaStatus {
    /// Not yet danced/judged
    #[default]
    Pending,
    /// Judged
    Completed,
}

/// A participant placed on a track
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackAssignment {
    /// Track number within the block, 1-based
    pub track: u8,
    /// Participant performing on the track
    pub participant_id: ParticipantId,
}

/// A physical subdivision of the floor within one heat
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Block number within the heat, 1-based
    pub number: u8,
    /// Track assignments, left to right
    pub tracks: Vec<TrackAssignment>,
}

/// A heat: a fixed set of participants performing simultaneously
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tanda {
    /// Deterministic identifier (`{cell}_{phase}_{number}`)
    pub id: TandaId,
    /// Cell the heat belongs to
    pub live_competition_id: LiveCompetitionId,
    /// Round the heat belongs to
    pub phase: Phase,
    /// Position within the round, 1-based
    pub number: u32,
    /// Blocks in floor order
    pub blocks: Vec<Block>,
    /// Completion status
    #[serde(default)]
    pub status: TandaStatus,
}

impl Tanda {
    /// Identifier of heat `number` of `phase` in `cell`
    #[must_use]
    pub fn id_for(cell: &LiveCompetitionId, phase: Phase, number: u32) -> TandaId {
        TandaId::new(format!("{cell}_{phase}_{number}"))
    }

    /// Document key of the heat inside its cell's `tandas` collection
    #[must_use]
    pub fn document_key(&self) -> String {
        format!("{}_{}", self.phase, self.number)
    }

    /// Participants in block-then-track order
    pub fn participants(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.blocks
            .iter()
            .flat_map(|block| block.tracks.iter().map(|track| track.participant_id))
    }

    /// Number of participants in the heat
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.blocks.iter().map(|block| block.tracks.len()).sum()
    }

    /// Whether the judging subsystem has marked the heat completed
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TandaStatus::Completed
    }
}

// ============================================================================
// Event document
// ============================================================================

/// The event document: running order plus the active-cell pointer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Event identifier
    pub id: EventId,
    /// Running order
    #[serde(default)]
    pub schedule: Vec<ScheduleItem>,
    /// Cell currently on the floor (advisory)
    #[serde(default)]
    pub current_live_competition_id: Option<LiveCompetitionId>,
    /// Cells finished so far, in finishing order
    #[serde(default)]
    pub completed_live_competitions: Vec<LiveCompetitionId>,
}

impl EventRecord {
    /// Creates an empty event document
    #[must_use]
    pub const fn new(id: EventId) -> Self {
        Self {
            id,
            schedule: Vec::new(),
            current_live_competition_id: None,
            completed_live_competitions: Vec::new(),
        }
    }

    /// Whether `cell` has been finished
    #[must_use]
    pub fn is_completed(&self, cell: &LiveCompetitionId) -> bool {
        self.completed_live_competitions.contains(cell)
    }

    /// Record `cell` as finished, releasing the active pointer if it holds
    /// `cell`.
    ///
    /// The completed set never holds duplicates. Finishing a cell that is not
    /// on the floor leaves the active cell in place.
    pub fn mark_finished(&mut self, cell: &LiveCompetitionId) {
        if !self.is_completed(cell) {
            self.completed_live_competitions.push(cell.clone());
        }
        if self.current_live_competition_id.as_ref() == Some(cell) {
            self.current_live_competition_id = None;
        }
    }
}
