//! Async stream adapter over a [`Selection`].
//!
//! The store delivers synchronously; this adapter forwards each delivered
//! value into a tokio unbounded channel so async consumers can `.await`
//! changes. Dropping the stream unsubscribes.

use crate::error::StoreError;
use crate::store::{Selection, Subscription};
use composable_state_core::Identity;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;

/// A [`Stream`] of changed projections
///
/// # Example
///
/// ```ignore
/// use futures::StreamExt;
///
/// let mut loading = store.select(|s| s.loading).into_stream();
/// while let Some(loading) = loading.next().await {
///     println!("loading: {loading}");
/// }
/// ```
pub struct SelectionStream<T> {
    receiver: mpsc::UnboundedReceiver<T>,
    subscription: Subscription,
}

impl<T> SelectionStream<T>
where
    T: Identity + Clone + Send + 'static,
{
    pub(crate) fn new<S>(selection: &Selection<S, T>) -> Self
    where
        S: Send + Sync + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let subscription = selection.subscribe(move |value| {
            // The receiver is only gone once this stream is dropped, and
            // dropping it unsubscribes.
            let _ = sender.send(value);
        });

        Self {
            receiver,
            subscription,
        }
    }

    /// Wait for the next changed value
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StreamClosed`] if the store was dropped.
    pub async fn next_value(&mut self) -> Result<T, StoreError> {
        self.receiver.recv().await.ok_or(StoreError::StreamClosed)
    }

    /// Wait for the first value matching `predicate`
    ///
    /// Non-matching values are consumed and discarded.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`]: `timeout` elapsed before a match arrived
    /// - [`StoreError::StreamClosed`]: the store was dropped
    pub async fn wait_for<F>(&mut self, predicate: F, timeout: Duration) -> Result<T, StoreError>
    where
        F: Fn(&T) -> bool,
    {
        tokio::time::timeout(timeout, async {
            loop {
                let value = self.next_value().await?;
                if predicate(&value) {
                    return Ok(value);
                }
            }
        })
        .await
        .map_err(|_| StoreError::Timeout(timeout))?
    }

    /// Returns true while the underlying subscription is active
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }
}

impl<T> Stream for SelectionStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}
