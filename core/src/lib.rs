//! # Tanda Core
//!
//! Domain types and pure algorithms for the competition-day scheduling engine.
//!
//! A dance-competition event is run as an ordered list of *cells*
//! (level × category × gender), each split into judged heats ("tandas") that
//! fit the stage layout configured for the cell. This crate holds everything
//! that can be expressed without I/O:
//!
//! - **Schedule building**: expanding a dance configuration into a running order
//! - **Reordering**: the index math behind drag-and-drop, plus the editing
//!   session reducer that decides when the running order is persisted
//! - **Stage layouts**: bounds checking of blocks, tracks and judges
//! - **Heat partitioning**: packing participants into tandas, row-major
//! - **Status derivation**: the `pending → ready → in-progress → completed`
//!   lifecycle computed from persisted facts
//!
//! The collaborators the engine talks to (the document store and the
//! registrant directory) are described here as traits and injected by the
//! application crate.
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Explicit effects: reducers describe persistence, they never perform it
//! - Dependency Injection via traits
//!
//! ## Example
//!
//! ```
//! use tanda_core::partition::partition;
//! use tanda_core::stage::LevelConfig;
//! use tanda_core::types::{Category, Gender, LevelId, LiveCompetitionId, Phase};
//!
//! let config = LevelConfig::new(2, 3, 2, "")?;
//! let cell = LiveCompetitionId::for_cell(
//!     &LevelId::new("Seriado"),
//!     &Category::new("Adulto"),
//!     Gender::Mixto,
//! );
//! let tandas = partition(&cell, Phase::Final, &[], config.layout())?;
//! assert!(tandas.is_empty());
//! # Ok::<(), tanda_core::error::ValidationError>(())
//! ```

pub mod document_store;
pub mod error;
pub mod live;
pub mod partition;
pub mod registrant;
pub mod schedule;
pub mod stage;
pub mod status;
pub mod types;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use smallvec::{smallvec, SmallVec};

pub use error::{CompetitionError, ValidationError};
pub use live::LiveCompetition;
pub use status::{derive_status, CompetitionStatus, StatusFacts};

/// Reducer module - the shape of every state machine in the engine
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They validate the action, update state in place and return descriptions of
/// the side effects the caller must perform. Whoever executes an effect feeds
/// its outcome back in as another action.
pub mod reducer {
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for session logic
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for ScheduleEditorReducer {
    ///     type State = ScheduleEditorState;
    ///     type Action = ScheduleEditorAction;
    ///     type Environment = ();
    ///     type Effect = ScheduleEditorEffect;
    ///
    ///     fn reduce(&self, state: &mut Self::State, action: Self::Action, env: &()) -> SmallVec<[Self::Effect; 4]> {
    ///         // Business logic here
    ///         SmallVec::new()
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// The effect descriptions this reducer emits
        type Effect;

        /// Reduce an action into state changes and effects
        ///
        /// Effects are descriptions only; nothing is persisted until the
        /// caller executes them and reports back.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Self::Effect; 4]>;
    }
}

/// Environment module - Dependency injection traits
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// Timestamps on live competitions (`createdAt`, `updatedAt`,
    /// `finishedAt`) are always taken from an injected clock.
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock implementation of [`Clock`]
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::environment::{Clock, SystemClock};

    #[test]
    fn system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
