//! The running order of an event.
//!
//! - [`builder`]: expands a dance configuration into schedule rows
//! - [`order`]: the pure index math behind drag-and-drop reordering
//! - [`editor`]: the editing session reducer deciding when the running order
//!   is written back

pub mod builder;
pub mod editor;
pub mod order;

pub use builder::{total_estimated_minutes, DanceConfiguration, LevelSelection, PhaseDurations, ScheduleBuilder};
pub use editor::{EditorError, ScheduleEditorAction, ScheduleEditorEffect, ScheduleEditorReducer, ScheduleEditorState};
pub use order::{drop_index, is_contiguous, move_item, renumber, DropPosition};
