//! Capture the values a selection emits.

use composable_state_core::Identity;
use composable_state_runtime::{Selection, Subscription};
use std::sync::{Arc, Mutex, PoisonError};

/// Records every value delivered to it, in order
///
/// Clones share the same log, so one clone can be moved into a callback
/// while another is inspected by the test.
#[derive(Debug)]
pub struct Recorder<T> {
    values: Arc<Mutex<Vec<T>>>,
}

impl<T> Recorder<T>
where
    T: Clone + Send + 'static,
{
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A callback that appends to this recorder
    #[must_use]
    pub fn sink(&self) -> impl Fn(T) + Send + Sync + 'static {
        let values = Arc::clone(&self.values);
        move |value| {
            values
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(value);
        }
    }

    /// Subscribe this recorder to a selection
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn attach<S>(&self, selection: &Selection<S, T>) -> Subscription
    where
        S: Send + Sync + 'static,
        T: Identity,
    {
        selection.subscribe(self.sink())
    }

    /// Snapshot of everything recorded so far
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded values
    #[must_use]
    pub fn len(&self) -> usize {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Most recently recorded value
    #[must_use]
    pub fn last(&self) -> Option<T> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// Drain the log, returning what was recorded
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.values.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
        }
    }
}

impl<T> Default for Recorder<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composable_state_runtime::StateStore;

    #[test]
    fn test_recorder_captures_in_order() {
        let store = StateStore::new(0_u32);
        let recorder = Recorder::new();
        let _sub = recorder.attach(&store.select(|s| **s));

        store.update_state(1);
        store.update_state(2);

        assert_eq!(recorder.values(), vec![1, 2]);
        assert_eq!(recorder.last(), Some(2));
    }

    #[test]
    fn test_take_drains() {
        let recorder = Recorder::new();
        let sink = recorder.sink();
        sink("a".to_string());

        assert_eq!(recorder.take(), vec!["a".to_string()]);
        assert!(recorder.is_empty());
    }
}
