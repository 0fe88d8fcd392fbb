//! Stage layouts: how many blocks, tracks and judges a cell runs with.
//!
//! Bounds:
//!
//! | blocks | tracks per block | judges |
//! |--------|------------------|--------|
//! | 1      | 1..=6            | 1..=8  |
//! | 2..=4  | 1..=4            | 1..=tracks per block |

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Maximum number of blocks on the floor
pub const MAX_BLOCKS: u8 = 4;
/// Maximum tracks when the floor is a single block
pub const MAX_TRACKS_SINGLE_BLOCK: u8 = 6;
/// Maximum tracks per block when the floor is split
pub const MAX_TRACKS_PER_BLOCK: u8 = 4;
/// Maximum judges when the floor is a single block
pub const MAX_JUDGES_SINGLE_BLOCK: u8 = 8;

/// Stage configuration of one cell
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfig {
    /// Floor subdivisions running simultaneously
    pub blocks: u8,
    /// Performance lanes per block
    pub tracks_per_block: u8,
    /// Judges on the panel
    pub judges_count: u8,
    /// Free-form operator notes
    #[serde(default)]
    pub notes: String,
}

impl LevelConfig {
    /// Build a validated configuration
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first bound that is violated.
    pub fn new(
        blocks: u8,
        tracks_per_block: u8,
        judges_count: u8,
        notes: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let config = Self {
            blocks,
            tracks_per_block,
            judges_count,
            notes: notes.into(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every bound of the layout
    ///
    /// Blocks are checked first because the other two bounds depend on them.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first bound that is violated.
    pub const fn validate(&self) -> Result<(), ValidationError> {
        if self.blocks < 1 || self.blocks > MAX_BLOCKS {
            return Err(ValidationError::BlocksOutOfRange {
                got: self.blocks,
                max: MAX_BLOCKS,
            });
        }

        let max_tracks = max_tracks_for(self.blocks);
        if self.tracks_per_block < 1 || self.tracks_per_block > max_tracks {
            return Err(ValidationError::TracksOutOfRange {
                got: self.tracks_per_block,
                max: max_tracks,
                blocks: self.blocks,
            });
        }

        let max_judges = max_judges_for(self.blocks, self.tracks_per_block);
        if self.judges_count < 1 || self.judges_count > max_judges {
            return Err(ValidationError::JudgesOutOfRange {
                got: self.judges_count,
                max: max_judges,
            });
        }

        Ok(())
    }

    /// Physical layout used for partitioning
    #[must_use]
    pub const fn layout(&self) -> StageLayout {
        StageLayout {
            blocks: self.blocks,
            tracks_per_block: self.tracks_per_block,
        }
    }
}

/// Upper bound on tracks per block for a block count
#[must_use]
pub const fn max_tracks_for(blocks: u8) -> u8 {
    if blocks == 1 {
        MAX_TRACKS_SINGLE_BLOCK
    } else {
        MAX_TRACKS_PER_BLOCK
    }
}

/// Upper bound on judges for a layout
#[must_use]
pub const fn max_judges_for(blocks: u8, tracks_per_block: u8) -> u8 {
    if blocks == 1 {
        MAX_JUDGES_SINGLE_BLOCK
    } else {
        tracks_per_block
    }
}

/// Blocks × tracks of a stage, the only part of the config heats depend on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StageLayout {
    /// Floor subdivisions
    pub blocks: u8,
    /// Lanes per block
    pub tracks_per_block: u8,
}

impl StageLayout {
    /// Participants per heat: `blocks × tracksPerBlock`
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.blocks as usize * self.tracks_per_block as usize
    }
}
