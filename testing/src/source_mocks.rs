//! In-memory data sources for deterministic tests
//!
//! - [`StaticSource`]: resolves with a fixed value after an optional delay
//! - [`FailingSource`]: resolves with a fixed error after an optional delay
//! - [`ManualSource`]: every fetch stays pending until the test resolves it,
//!   in whatever order the test chooses

use composable_state_core::{DataSource, SourceError, SourceFuture};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;

/// Data source that always yields the same value
///
/// # Example
///
/// ```
/// use composable_state_testing::StaticSource;
/// use composable_state_core::DataSource;
///
/// # async fn example() {
/// let source = StaticSource::new(vec![1, 2, 3]);
/// assert_eq!(source.fetch().await, Ok(vec![1, 2, 3]));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct StaticSource<T> {
    value: T,
    delay: Duration,
}

impl<T> StaticSource<T> {
    /// Resolve immediately with `value`
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            value,
            delay: Duration::ZERO,
        }
    }

    /// Wait `delay` before resolving
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl<T> DataSource<T> for StaticSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fetch(&self) -> SourceFuture<'_, T> {
        let value = self.value.clone();
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(value)
        })
    }
}

/// Data source that always fails
#[derive(Debug, Clone)]
pub struct FailingSource {
    error: SourceError,
    delay: Duration,
}

impl FailingSource {
    /// Resolve immediately with `error`
    #[must_use]
    pub const fn new(error: SourceError) -> Self {
        Self {
            error,
            delay: Duration::ZERO,
        }
    }

    /// Wait `delay` before failing
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl<T> DataSource<T> for FailingSource
where
    T: Send + 'static,
{
    fn fetch(&self) -> SourceFuture<'_, T> {
        let error = self.error.clone();
        let delay = self.delay;
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Err(error)
        })
    }
}

type Pending<T> = oneshot::Sender<Result<T, SourceError>>;

/// Data source whose fetches are resolved by hand
///
/// Each call to `fetch` registers a pending slot, numbered from zero in
/// call order. A fetch whose slot is dropped unresolved fails with
/// [`SourceError::Unavailable`].
///
/// # Example
///
/// ```ignore
/// let source = ManualSource::new();
/// let first = tokio::spawn({ let s = source.clone(); async move { s.fetch().await } });
/// let second = tokio::spawn({ let s = source.clone(); async move { s.fetch().await } });
///
/// // Resolve out of order
/// source.resolve(1, vec!["b"]);
/// source.resolve(0, vec!["a"]);
/// ```
pub struct ManualSource<T> {
    slots: Arc<Mutex<Vec<Option<Pending<T>>>>>,
}

impl<T> ManualSource<T>
where
    T: Send + 'static,
{
    /// Create a source with no pending fetches
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of fetches started so far
    #[must_use]
    pub fn started(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Number of fetches still waiting to be resolved
    #[must_use]
    pub fn pending(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    /// Resolve fetch number `index` with `value`
    ///
    /// Returns false if there is no such pending fetch.
    pub fn resolve(&self, index: usize, value: T) -> bool {
        self.complete(index, Ok(value))
    }

    /// Fail fetch number `index` with `error`
    ///
    /// Returns false if there is no such pending fetch.
    pub fn fail(&self, index: usize, error: SourceError) -> bool {
        self.complete(index, Err(error))
    }

    fn complete(&self, index: usize, outcome: Result<T, SourceError>) -> bool {
        let sender = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(index)
            .and_then(Option::take);

        sender.is_some_and(|sender| sender.send(outcome).is_ok())
    }
}

impl<T> DataSource<T> for ManualSource<T>
where
    T: Send + 'static,
{
    fn fetch(&self) -> SourceFuture<'_, T> {
        let (sender, receiver) = oneshot::channel();
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Some(sender));

        Box::pin(async move {
            receiver.await.unwrap_or_else(|_| {
                Err(SourceError::Unavailable(
                    "manual fetch dropped unresolved".to_string(),
                ))
            })
        })
    }
}

impl<T> Clone for ManualSource<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<T> Default for ManualSource<T>
where
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_static_source_waits_for_delay() {
        let source = StaticSource::new(5_u8).with_delay(Duration::from_secs(1));
        let start = tokio::time::Instant::now();

        assert_eq!(source.fetch().await, Ok(5));
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_failing_source() {
        let source = FailingSource::new(SourceError::Unavailable("down".to_string()));
        let result: Result<u8, SourceError> = source.fetch().await;
        assert_eq!(result, Err(SourceError::Unavailable("down".to_string())));
    }

    #[tokio::test]
    async fn test_manual_source_resolves_out_of_order() {
        let source = ManualSource::new();
        let first = source.fetch();
        let second = source.fetch();
        assert_eq!(source.pending(), 2);

        assert!(source.resolve(1, "second"));
        assert!(source.resolve(0, "first"));
        assert!(!source.resolve(0, "again"));

        assert_eq!(second.await, Ok("second"));
        assert_eq!(first.await, Ok("first"));
        assert_eq!(source.pending(), 0);
        assert_eq!(source.started(), 2);
    }

    #[tokio::test]
    async fn test_manual_source_fail() {
        let source = ManualSource::<u8>::new();
        let fetch = source.fetch();
        assert!(source.fail(0, SourceError::Timeout(Duration::from_secs(2))));
        assert_eq!(fetch.await, Err(SourceError::Timeout(Duration::from_secs(2))));
    }
}
