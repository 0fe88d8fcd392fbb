//! Ergonomic testing utilities for reducers
//!
//! This module provides a fluent API for testing reducers with readable Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use tanda_core::reducer::Reducer;

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for effect assertion functions
type EffectAssertion<F> = Box<dyn FnOnce(&[F])>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// Actions passed to [`given_actions`](Self::given_actions) are replayed on
/// the initial state first and their effects discarded, so a test can start
/// from "an edited, unsaved session" without spelling out the state.
///
/// # Example
///
/// ```
/// use tanda_core::schedule::editor::{ScheduleEditorAction, ScheduleEditorReducer, ScheduleEditorState};
/// use tanda_testing::ReducerTest;
///
/// ReducerTest::new(ScheduleEditorReducer::new())
///     .with_env(())
///     .given_state(ScheduleEditorState::default())
///     .when_action(ScheduleEditorAction::Save)
///     .then_effects(|effects| assert!(effects.is_empty()))
///     .run();
/// ```
pub struct ReducerTest<R>
where
    R: Reducer,
{
    reducer: R,
    environment: Option<R::Environment>,
    initial_state: Option<R::State>,
    setup: Vec<R::Action>,
    action: Option<R::Action>,
    state_assertions: Vec<StateAssertion<R::State>>,
    effect_assertions: Vec<EffectAssertion<R::Effect>>,
}

impl<R> ReducerTest<R>
where
    R: Reducer,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            setup: Vec::new(),
            action: None,
            state_assertions: Vec::new(),
            effect_assertions: Vec::new(),
        }
    }

    /// Set the environment for the test
    #[must_use]
    pub fn with_env(mut self, env: R::Environment) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: R::State) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Actions already applied before the one under test (Given)
    #[must_use]
    pub fn given_actions(mut self, actions: impl IntoIterator<Item = R::Action>) -> Self {
        self.setup.extend(actions);
        self
    }

    /// Set the action to test (When)
    #[must_use]
    pub fn when_action(mut self, action: R::Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&R::State) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the effects of the action under test (Then)
    #[must_use]
    pub fn then_effects<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[R::Effect]) + 'static,
    {
        self.effect_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state, action, or environment is not set,
    /// or if any assertions fail.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        let action = self.action.expect("Action must be set with when_action()");

        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        for earlier in self.setup {
            let _ = self.reducer.reduce(&mut state, earlier, &env);
        }

        let effects = self.reducer.reduce(&mut state, action, &env);

        for assertion in self.state_assertions {
            assertion(&state);
        }

        for assertion in self.effect_assertions {
            assertion(&effects);
        }
    }
}

/// Helper assertions for effects
pub mod assertions {
    /// Assert that there are no effects
    ///
    /// # Panics
    ///
    /// Panics if effects is not empty.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_no_effects<F: std::fmt::Debug>(effects: &[F]) {
        assert!(
            effects.is_empty(),
            "Expected no effects, but found {}: {:?}",
            effects.len(),
            effects
        );
    }

    /// Assert the number of effects
    ///
    /// # Panics
    ///
    /// Panics if the number of effects doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_effects_count<F>(effects: &[F], expected: usize) {
        assert_eq!(
            effects.len(),
            expected,
            "Expected {} effects, but found {}",
            expected,
            effects.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tanda_core::schedule::editor::{
        EditorError, ScheduleEditorAction, ScheduleEditorEffect, ScheduleEditorReducer, ScheduleEditorState,
    };
    use tanda_core::types::{Category, Gender, LevelId, Phase, ScheduleItem, ScheduleItemId};

    fn running_order() -> Vec<ScheduleItem> {
        ["Baby", "Infantil", "Adulto"]
            .into_iter()
            .zip(0u32..)
            .map(|(category, order)| ScheduleItem {
                id: ScheduleItemId::new(),
                level_id: LevelId::new("Seriado"),
                category: Category::new(category),
                gender: Gender::Mixto,
                phase: Phase::Final,
                order,
                estimated_time: 10,
            })
            .collect()
    }

    #[test]
    fn save_after_move_persists_working_copy() {
        ReducerTest::new(ScheduleEditorReducer::new())
            .with_env(())
            .given_state(ScheduleEditorState::loaded(running_order()))
            .given_actions([ScheduleEditorAction::MoveItem { from: 2, to: 0 }])
            .when_action(ScheduleEditorAction::Save)
            .then_state(|state| {
                assert!(state.saving);
                assert_eq!(state.working[0].category, Category::new("Adulto"));
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                let ScheduleEditorEffect::Persist { items } = &effects[0];
                assert_eq!(items[0].category, Category::new("Adulto"));
                assert_eq!(items[0].order, 0);
            })
            .run();
    }

    #[test]
    fn failed_save_keeps_session_dirty() {
        ReducerTest::new(ScheduleEditorReducer::new())
            .with_env(())
            .given_state(ScheduleEditorState::loaded(running_order()))
            .given_actions([
                ScheduleEditorAction::MoveItem { from: 0, to: 1 },
                ScheduleEditorAction::Save,
            ])
            .when_action(ScheduleEditorAction::SaveFailed {
                error: "store unavailable".to_string(),
            })
            .then_state(|state| {
                assert!(state.dirty);
                assert!(!state.saving);
                assert_ne!(state.working, state.persisted);
                assert!(matches!(state.last_error, Some(EditorError::SaveFailed(_))));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn setup_effects_are_not_reported() {
        ReducerTest::new(ScheduleEditorReducer::new())
            .with_env(())
            .given_state(ScheduleEditorState::loaded(running_order()))
            .given_actions([
                ScheduleEditorAction::MoveItem { from: 0, to: 2 },
                ScheduleEditorAction::Save,
            ])
            .when_action(ScheduleEditorAction::Discard)
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}
