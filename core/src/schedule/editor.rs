//! Editing session for the running order.
//!
//! Edits happen on a working copy. Nothing reaches the store until `Save`,
//! which emits one [`ScheduleEditorEffect::Persist`] carrying the whole
//! array. The persisted snapshot only moves when the store acknowledges the
//! write (`Saved`); a failed write (`SaveFailed`) keeps the edits so the
//! operator can retry, and `Discard` restores the snapshot.

use super::order::{drop_index, move_item, DropPosition};
use crate::error::ValidationError;
use crate::reducer::Reducer;
use crate::types::ScheduleItem;
use smallvec::{smallvec, SmallVec};
use thiserror::Error;

/// Last failure recorded by the editor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// An edit was rejected; the working copy is unchanged
    #[error("{0}")]
    Invalid(#[from] ValidationError),

    /// The store did not acknowledge the save; edits are kept
    #[error("saving the running order failed: {0}")]
    SaveFailed(String),
}

/// State of one event's editing session
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScheduleEditorState {
    /// Last running order acknowledged by the store
    pub persisted: Vec<ScheduleItem>,
    /// Running order as currently edited
    pub working: Vec<ScheduleItem>,
    /// Working copy differs from what was last saved
    pub dirty: bool,
    /// A save is in flight
    pub saving: bool,
    /// Last rejected edit or failed save
    pub last_error: Option<EditorError>,
}

impl ScheduleEditorState {
    /// Session opened on a persisted running order
    #[must_use]
    pub fn loaded(items: Vec<ScheduleItem>) -> Self {
        Self {
            persisted: items.clone(),
            working: items,
            ..Self::default()
        }
    }
}

/// Actions of the editing session
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScheduleEditorAction {
    // Commands
    /// Replace both snapshot and working copy (open or rebuild)
    Load {
        /// Persisted running order
        items: Vec<ScheduleItem>,
    },
    /// Move the row at `from` to `to`
    MoveItem {
        /// Current index
        from: usize,
        /// Destination index
        to: usize,
    },
    /// Drop the row at `from` above or below the row at `target`
    DropOnto {
        /// Dragged row
        from: usize,
        /// Row it was dropped on
        target: usize,
        /// Side of the target
        position: DropPosition,
    },
    /// Hand-edit a row's duration
    SetEstimatedTime {
        /// Row index
        index: usize,
        /// New duration in minutes
        minutes: u32,
    },
    /// Throw away edits and restore the snapshot
    Discard,
    /// Write the working copy back
    Save,

    // Outcomes
    /// The store acknowledged the write of `items`
    Saved {
        /// Running order that was written
        items: Vec<ScheduleItem>,
    },
    /// The store rejected or lost the write
    SaveFailed {
        /// Store error message
        error: String,
    },
}

/// Side effects requested by the editor
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScheduleEditorEffect {
    /// Replace the stored running order with `items`, in one write
    Persist {
        /// Full running order
        items: Vec<ScheduleItem>,
    },
}

/// Reducer of the editing session
#[derive(Clone, Copy, Debug, Default)]
pub struct ScheduleEditorReducer;

impl ScheduleEditorReducer {
    /// Creates a new `ScheduleEditorReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn apply_edit(
        state: &mut ScheduleEditorState,
        edit: impl FnOnce(&[ScheduleItem]) -> Result<Vec<ScheduleItem>, ValidationError>,
    ) {
        match edit(&state.working) {
            Ok(items) => {
                state.working = items;
                state.dirty = state.working != state.persisted;
                state.last_error = None;
            }
            Err(error) => state.last_error = Some(EditorError::Invalid(error)),
        }
    }
}

impl Reducer for ScheduleEditorReducer {
    type State = ScheduleEditorState;
    type Action = ScheduleEditorAction;
    type Environment = ();
    type Effect = ScheduleEditorEffect;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Self::Effect; 4]> {
        match action {
            ScheduleEditorAction::Load { items } => {
                *state = ScheduleEditorState::loaded(items);
                SmallVec::new()
            }

            ScheduleEditorAction::MoveItem { from, to } => {
                Self::apply_edit(state, |items| move_item(items, from, to));
                SmallVec::new()
            }

            ScheduleEditorAction::DropOnto { from, target, position } => {
                Self::apply_edit(state, |items| {
                    let to = drop_index(from, target, position, items.len())?;
                    move_item(items, from, to)
                });
                SmallVec::new()
            }

            ScheduleEditorAction::SetEstimatedTime { index, minutes } => {
                Self::apply_edit(state, |items| {
                    if minutes == 0 {
                        return Err(ValidationError::InvalidEstimatedTime);
                    }
                    let mut edited = items.to_vec();
                    let len = edited.len();
                    let item = edited
                        .get_mut(index)
                        .ok_or(ValidationError::IndexOutOfRange { index, len })?;
                    item.estimated_time = minutes;
                    Ok(edited)
                });
                SmallVec::new()
            }

            ScheduleEditorAction::Discard => {
                state.working = state.persisted.clone();
                state.dirty = false;
                state.last_error = None;
                SmallVec::new()
            }

            ScheduleEditorAction::Save => {
                if !state.dirty || state.saving {
                    return SmallVec::new();
                }
                state.saving = true;
                smallvec![ScheduleEditorEffect::Persist {
                    items: state.working.clone(),
                }]
            }

            ScheduleEditorAction::Saved { items } => {
                state.saving = false;
                state.dirty = state.working != items;
                state.persisted = items;
                state.last_error = None;
                SmallVec::new()
            }

            ScheduleEditorAction::SaveFailed { error } => {
                state.saving = false;
                state.last_error = Some(EditorError::SaveFailed(error));
                SmallVec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::order::{is_contiguous, renumber};
    use crate::types::{Category, Gender, LevelId, Phase, ScheduleItemId};

    fn schedule(len: usize) -> Vec<ScheduleItem> {
        let mut items: Vec<ScheduleItem> = (0..len)
            .map(|index| ScheduleItem {
                id: ScheduleItemId::new(),
                level_id: LevelId::new("Seriado"),
                category: Category::new(format!("C{index}")),
                gender: Gender::Mixto,
                phase: Phase::Final,
                order: 0,
                estimated_time: 10,
            })
            .collect();
        renumber(&mut items);
        items
    }

    fn reduce(state: &mut ScheduleEditorState, action: ScheduleEditorAction) -> SmallVec<[ScheduleEditorEffect; 4]> {
        ScheduleEditorReducer::new().reduce(state, action, &())
    }

    #[test]
    fn move_marks_dirty_without_effects() {
        let mut state = ScheduleEditorState::loaded(schedule(3));
        let effects = reduce(&mut state, ScheduleEditorAction::MoveItem { from: 0, to: 2 });

        assert!(effects.is_empty());
        assert!(state.dirty);
        assert!(is_contiguous(&state.working));
        assert_ne!(state.working, state.persisted);
    }

    #[test]
    fn moving_back_clears_dirty() {
        let mut state = ScheduleEditorState::loaded(schedule(3));
        reduce(&mut state, ScheduleEditorAction::MoveItem { from: 0, to: 2 });
        reduce(&mut state, ScheduleEditorAction::MoveItem { from: 2, to: 0 });
        assert!(!state.dirty);
    }

    #[test]
    fn save_emits_one_full_persist() {
        let mut state = ScheduleEditorState::loaded(schedule(4));
        reduce(&mut state, ScheduleEditorAction::MoveItem { from: 3, to: 0 });

        let effects = reduce(&mut state, ScheduleEditorAction::Save);

        assert_eq!(effects.len(), 1);
        let ScheduleEditorEffect::Persist { items } = &effects[0];
        assert_eq!(items, &state.working);
        assert!(state.saving);
    }

    #[test]
    fn snapshot_moves_only_on_ack() {
        let mut state = ScheduleEditorState::loaded(schedule(3));
        let original = state.persisted.clone();
        reduce(&mut state, ScheduleEditorAction::MoveItem { from: 0, to: 1 });
        reduce(&mut state, ScheduleEditorAction::Save);
        assert_eq!(state.persisted, original);

        let written = state.working.clone();
        reduce(&mut state, ScheduleEditorAction::Saved { items: written.clone() });
        assert_eq!(state.persisted, written);
        assert!(!state.dirty);
        assert!(!state.saving);
    }

    #[test]
    fn failed_save_keeps_edits_for_retry() {
        let mut state = ScheduleEditorState::loaded(schedule(3));
        let original = state.persisted.clone();
        reduce(&mut state, ScheduleEditorAction::MoveItem { from: 0, to: 2 });
        reduce(&mut state, ScheduleEditorAction::Save);
        reduce(&mut state, ScheduleEditorAction::SaveFailed { error: "timeout".into() });

        assert_eq!(state.persisted, original);
        assert!(state.dirty);
        assert!(!state.saving);
        assert!(matches!(state.last_error, Some(EditorError::SaveFailed(_))));
        assert_eq!(reduce(&mut state, ScheduleEditorAction::Save).len(), 1);
    }

    #[test]
    fn clean_session_does_not_save() {
        let mut state = ScheduleEditorState::loaded(schedule(2));
        assert!(reduce(&mut state, ScheduleEditorAction::Save).is_empty());
    }

    #[test]
    fn discard_restores_snapshot() {
        let mut state = ScheduleEditorState::loaded(schedule(3));
        reduce(&mut state, ScheduleEditorAction::DropOnto {
            from: 0,
            target: 2,
            position: DropPosition::Below,
        });
        reduce(&mut state, ScheduleEditorAction::SetEstimatedTime { index: 1, minutes: 30 });
        reduce(&mut state, ScheduleEditorAction::Discard);

        assert_eq!(state.working, state.persisted);
        assert!(!state.dirty);
    }

    #[test]
    fn rejected_edit_leaves_working_copy() {
        let mut state = ScheduleEditorState::loaded(schedule(2));
        let before = state.working.clone();

        reduce(&mut state, ScheduleEditorAction::MoveItem { from: 0, to: 5 });
        assert_eq!(state.working, before);
        assert!(matches!(state.last_error, Some(EditorError::Invalid(ValidationError::IndexOutOfRange { .. }))));

        reduce(&mut state, ScheduleEditorAction::SetEstimatedTime { index: 0, minutes: 0 });
        assert_eq!(state.last_error, Some(EditorError::Invalid(ValidationError::InvalidEstimatedTime)));
        assert!(!state.dirty);
    }

    #[test]
    fn estimated_time_edit_is_kept() {
        let mut state = ScheduleEditorState::loaded(schedule(2));
        reduce(&mut state, ScheduleEditorAction::SetEstimatedTime { index: 1, minutes: 25 });
        assert_eq!(state.working[1].estimated_time, 25);
        assert!(state.dirty);
    }
}
