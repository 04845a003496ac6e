//! # Composable State Core
//!
//! Core traits and types for observable state stores.
//!
//! This crate holds the pieces a store and its consumers agree on, without
//! any runtime machinery:
//!
//! - **State shape**: whether a state is a composite record (patched by
//!   shallow merge) or a scalar (patched by replacement), decided statically
//! - **Identity**: the change-detection equality used to suppress duplicate
//!   emissions of projected values
//! - **Projector**: a shared function deriving a slice from the full state
//! - **Data source**: the one-shot, delayed fetch contract consumed by
//!   application actions
//!
//! ## Architecture Principles
//!
//! - State is never mutated in place; every write produces a new value
//! - Identity comparison is only meaningful because of the above
//! - Dependencies are injected explicitly, never looked up globally
//!
//! ## Example
//!
//! ```ignore
//! use composable_state_core::StateShape;
//! use composable_state_macros::Record;
//! use std::sync::Arc;
//!
//! #[derive(Record, Clone, Debug)]
//! struct TodosState {
//!     loading: bool,
//!     todos: Arc<[Todo]>,
//! }
//!
//! let state = TodosState { loading: false, todos: Arc::from(vec![]) };
//! let next = state.merge(TodosStatePatch::default().with_loading(true));
//! assert!(next.loading);
//! assert!(Arc::ptr_eq(&state.todos, &next.todos));
//! ```

// Re-export commonly used types
pub use serde::{Deserialize, Serialize};

pub mod identity;
pub mod shape;
pub mod source;

/// Projector module - shared functions from a state to one of its slices
///
/// A projector receives the store's `Arc` handle rather than a bare
/// reference so that the identity projection can hand back the state itself.
pub mod projector {
    use std::sync::Arc;

    /// A projection from the full state `S` to a selected value `T`
    ///
    /// Projectors are shared behind an `Arc`; two projectors are considered
    /// the same projection only when they are the same allocation.
    pub type Projector<S, T> = Arc<dyn Fn(&Arc<S>) -> T + Send + Sync>;

    /// Wrap a closure into a shareable [`Projector`]
    ///
    /// Hold on to the returned value when the projector must keep its
    /// identity across calls (for example when rebinding a view).
    #[must_use]
    pub fn projector<S, T, F>(f: F) -> Projector<S, T>
    where
        F: Fn(&Arc<S>) -> T + Send + Sync + 'static,
    {
        Arc::new(f)
    }

    /// The identity projection, yielding the state handle itself
    #[must_use]
    pub fn whole_state<S>() -> Projector<S, Arc<S>>
    where
        S: Send + Sync + 'static,
    {
        Arc::new(|state: &Arc<S>| Arc::clone(state))
    }
}

pub use identity::Identity;
pub use projector::{Projector, projector, whole_state};
pub use shape::{ShapeKind, StateShape};
pub use source::{DataSource, SourceError, SourceFuture};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn whole_state_preserves_identity() {
        let state = Arc::new(7_u32);
        let project = whole_state::<u32>();

        let selected = project(&state);
        assert!(Arc::ptr_eq(&state, &selected));
    }

    #[test]
    fn projector_applies_closure() {
        let project = projector(|s: &Arc<(u8, &'static str)>| s.1);
        assert_eq!(project(&Arc::new((1, "slice"))), "slice");
    }
}
