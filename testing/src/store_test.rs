//! Ergonomic testing utilities for stores
//!
//! This module provides a fluent API for testing store writes with readable
//! Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // StoreTest is the natural name

use crate::recorder::Recorder;
use composable_state_core::{Identity, Projector};
use composable_state_runtime::StateStore;

/// Type alias for a write applied to the store under test
type Write<S> = Box<dyn FnOnce(&StateStore<S>)>;

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for emission assertion functions
type EmissionAssertion<T> = Box<dyn FnOnce(&[T])>;

/// Fluent API for testing stores with Given-When-Then syntax
///
/// The observed selection is subscribed before any write runs, so
/// emission assertions see exactly what a subscriber would have seen.
///
/// # Example
///
/// ```ignore
/// use composable_state_testing::StoreTest;
///
/// StoreTest::new()
///     .given_state(TodosState::default())
///     .observing(projector(|s: &Arc<TodosState>| s.loading))
///     .when(|store| store.patch_state(TodosStatePatch::default().with_loading(true)))
///     .when(|store| store.patch_state(TodosStatePatch::default().with_loading(true)))
///     .then_state(|state| assert!(state.loading))
///     .then_emissions(|emitted| assert_eq!(emitted, &[true]))
///     .run();
/// ```
pub struct StoreTest<S, T> {
    initial_state: Option<S>,
    projector: Option<Projector<S, T>>,
    writes: Vec<Write<S>>,
    state_assertions: Vec<StateAssertion<S>>,
    emission_assertions: Vec<EmissionAssertion<T>>,
}

impl<S, T> StoreTest<S, T>
where
    S: Send + Sync + 'static,
    T: Identity + Clone + Send + 'static,
{
    /// Create an empty test
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_state: None,
            projector: None,
            writes: Vec::new(),
            state_assertions: Vec::new(),
            emission_assertions: Vec::new(),
        }
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Set the selection whose emissions are recorded
    #[must_use]
    pub fn observing(mut self, projector: Projector<S, T>) -> Self {
        self.projector = Some(projector);
        self
    }

    /// Add a write to perform, in order (When)
    #[must_use]
    pub fn when<F>(mut self, write: F) -> Self
    where
        F: FnOnce(&StateStore<S>) + 'static,
    {
        self.writes.push(Box::new(write));
        self
    }

    /// Add an assertion about the final state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Add an assertion about the recorded emissions (Then)
    #[must_use]
    pub fn then_emissions<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[T]) + 'static,
    {
        self.emission_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if the initial state is not set, if emission assertions were
    /// added without a selection to observe, or if any assertion fails.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let initial = self
            .initial_state
            .expect("Initial state must be set with given_state()");
        let store = StateStore::new(initial);

        let recorder = Recorder::new();
        let subscription = match self.projector {
            Some(projector) => Some(recorder.attach(&store.select_with(projector))),
            None if self.emission_assertions.is_empty() => None,
            None => panic!("then_emissions() requires a selection set with observing()"),
        };

        for write in self.writes {
            write(&store);
        }

        let state = store.state();
        for assertion in self.state_assertions {
            assertion(&state);
        }

        let emitted = recorder.values();
        for assertion in self.emission_assertions {
            assertion(&emitted);
        }

        drop(subscription);
    }
}

impl<S, T> Default for StoreTest<S, T>
where
    S: Send + Sync + 'static,
    T: Identity + Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composable_state_core::projector;
    use composable_state_macros::Record;
    use std::sync::Arc;

    #[derive(Record, Clone, Debug)]
    struct Flags {
        on: bool,
        hits: u32,
    }

    #[test]
    fn test_given_when_then() {
        StoreTest::new()
            .given_state(Flags { on: false, hits: 0 })
            .observing(projector(|s: &Arc<Flags>| s.on))
            .when(|store| store.patch_state(FlagsPatch::default().with_on(true)))
            .when(|store| store.patch_state(FlagsPatch::default().with_hits(1_u32)))
            .when(|store| store.patch_state(FlagsPatch::default().with_on(true)))
            .then_state(|state| {
                assert!(state.on);
                assert_eq!(state.hits, 1);
            })
            .then_emissions(|emitted| assert_eq!(emitted, &[true]))
            .run();
    }

    #[test]
    fn test_state_only() {
        StoreTest::<u8, u8>::new()
            .given_state(1)
            .when(|store| store.update_state(2))
            .then_state(|state| assert_eq!(*state, 2))
            .run();
    }
}
