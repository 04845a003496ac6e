//! # Composable State Testing
//!
//! Testing utilities and helpers for observable state stores.
//!
//! This crate provides:
//! - [`Recorder`]: captures every value a selection emits
//! - [`StoreTest`]: Given-When-Then harness for store writes
//! - Mock [`DataSource`](composable_state_core::DataSource) implementations
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```ignore
//! use composable_state_testing::Recorder;
//!
//! #[test]
//! fn loading_flag_is_emitted_once() {
//!     let store = StateStore::new(TodosState::default());
//!     let loading = Recorder::new();
//!     let _sub = loading.attach(&store.select(|s| s.loading));
//!
//!     store.patch_state(TodosStatePatch::default().with_loading(true));
//!     store.patch_state(TodosStatePatch::default().with_loading(true));
//!
//!     assert_eq!(loading.values(), vec![true]);
//! }
//! ```

/// Emission recorder
pub mod recorder;

/// Mock data sources
pub mod source_mocks;

/// Given-When-Then harness for stores
pub mod store_test;

/// Test helpers and utilities
pub mod helpers {
    use tracing_subscriber::EnvFilter;

    /// Install a test-friendly tracing subscriber
    ///
    /// Output goes through the test harness writer so it is only shown for
    /// failing tests. Safe to call from every test; only the first call
    /// installs anything. Honors `RUST_LOG`, defaulting to `debug`.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities
///
/// Strategies for the small vocabulary store tests need: identifiers,
/// human-readable text, and sequences of flag toggles.
pub mod properties {
    use proptest::collection::vec;
    use proptest::prelude::*;

    /// Short numeric identifiers such as `"123"`
    pub fn arb_identifier() -> impl Strategy<Value = String> {
        "[0-9]{1,6}"
    }

    /// Short printable titles
    pub fn arb_title() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z ]{0,23}"
    }

    /// A sequence of boolean writes, possibly with repeats
    pub fn arb_flag_writes() -> impl Strategy<Value = Vec<bool>> {
        vec(any::<bool>(), 0..32)
    }
}

// Re-export commonly used items
pub use helpers::init_test_tracing;
pub use recorder::Recorder;
pub use source_mocks::{FailingSource, ManualSource, StaticSource};
pub use store_test::StoreTest;
