//! Data-source abstraction consumed by application actions.
//!
//! A data source is a one-shot producer: calling [`DataSource::fetch`]
//! yields a future that resolves exactly once (usually after some delay)
//! with either a value or a [`SourceError`]. Actions that load data into a
//! store await that future and patch the result in.
//!
//! # Dyn Compatibility
//!
//! This trait uses explicit `Pin<Box<dyn Future>>` returns instead of
//! `async fn` so that sources can be injected as `Arc<dyn DataSource<T>>`.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Errors a data source can resolve with
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The source could not produce a value
    #[error("Data source unavailable: {0}")]
    Unavailable(String),

    /// The source did not resolve in time
    #[error("Data source timed out after {0:?}")]
    Timeout(Duration),
}

/// Future returned by [`DataSource::fetch`]
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// A one-shot, possibly delayed, producer of `T`
///
/// # Example
///
/// ```ignore
/// struct TodoApi;
///
/// impl DataSource<Vec<Todo>> for TodoApi {
///     fn fetch(&self) -> SourceFuture<'_, Vec<Todo>> {
///         Box::pin(async {
///             tokio::time::sleep(Duration::from_secs(1)).await;
///             Ok(fixture_todos())
///         })
///     }
/// }
/// ```
pub trait DataSource<T>: Send + Sync {
    /// Start a fetch; the returned future resolves exactly once
    ///
    /// # Errors
    ///
    /// Resolves to a [`SourceError`] when the value cannot be produced.
    fn fetch(&self) -> SourceFuture<'_, T>;
}
