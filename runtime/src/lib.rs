//! # Composable State Runtime
//!
//! Runtime implementation for observable state stores.
//!
//! This crate provides the [`StateStore`] that owns application state and
//! the adapters that let consumers observe it.
//!
//! ## Core Components
//!
//! - **`StateStore`**: Holds one current state, replaced wholesale on every write
//! - **`Selection`**: A projected, duplicate-suppressing view of the store
//! - **`Subscription`**: RAII handle for an active observer
//! - **`SelectionStream`**: Async `Stream` adapter over a selection
//! - **`ViewBinding`**: Keeps a rendering component's value in sync with a selection
//!
//! ## Delivery Guarantees
//!
//! - Notifications run synchronously on the writing thread, before the
//!   outermost write call returns
//! - Every subscriber sees replacements in commit order, subscribers are
//!   visited in registration order
//! - A subscriber is only notified when its projected value is not the
//!   [`Identity::same`](composable_state_core::Identity::same) as the last
//!   one it saw
//! - After `unsubscribe` (or drop) a subscriber is never notified again
//!
//! ## Example
//!
//! ```ignore
//! use composable_state_runtime::StateStore;
//!
//! let store = StateStore::new(TodosState::default());
//!
//! // Observe a slice
//! let _sub = store
//!     .select(|s| s.loading)
//!     .subscribe(|loading| println!("loading: {loading}"));
//!
//! // Shallow-merge a partial update
//! store.patch_state(TodosStatePatch::default().with_loading(true));
//!
//! // Read state
//! let loading = store.with_state(|s| s.loading);
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

/// View binding between a store selection and a rendering component
pub mod binding;

/// Metric names and descriptions
pub mod metrics;

/// The state store, selections and subscriptions
pub mod store;

/// Async stream adapter over selections
pub mod stream;

/// Error types for the runtime
pub mod error {
    use std::time::Duration;
    use thiserror::Error;

    /// Errors that can occur while consuming a selection asynchronously
    ///
    /// Store reads and writes themselves never fail.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// The store behind a selection stream was dropped
        ///
        /// No further values can arrive.
        #[error("Selection stream closed: the store was dropped")]
        StreamClosed,

        /// Timeout waiting for a matching value
        ///
        /// Returned by `SelectionStream::wait_for` when the timeout expires
        /// before a matching value is received.
        #[error("Timeout after {0:?} waiting for a matching value")]
        Timeout(Duration),
    }
}

/// Configuration for [`StateStore`] instances
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::default()
///     .with_label("todos")
///     .with_subscriber_warn_threshold(16);
///
/// let store = StateStore::with_config(TodosState::default(), config);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Name used in log fields and metric labels
    pub label: String,
    /// Subscriber count above which a possible leak is logged
    pub subscriber_warn_threshold: usize,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    ///
    /// # Arguments
    ///
    /// - `label`: Name used in logs and metric labels
    /// - `subscriber_warn_threshold`: Warn once the subscriber count exceeds this
    #[must_use]
    pub fn new(label: impl Into<String>, subscriber_warn_threshold: usize) -> Self {
        Self {
            label: label.into(),
            subscriber_warn_threshold,
        }
    }

    /// Set the store label
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the subscriber warning threshold
    #[must_use]
    pub const fn with_subscriber_warn_threshold(mut self, threshold: usize) -> Self {
        self.subscriber_warn_threshold = threshold;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            label: "store".to_string(),
            subscriber_warn_threshold: 64,
        }
    }
}

/// Lock a mutex, recovering the guard if a previous holder panicked
///
/// Every value guarded in this crate is either replaced whole or is a
/// plain bookkeeping field, so a poisoned lock never exposes a half-written
/// value.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub use binding::ViewBinding;
pub use error::StoreError;
pub use store::{Selection, StateStore, Subscription};
pub use stream::SelectionStream;
