//! Mock todo backend.
//!
//! There is no server: [`TodoApi`] waits a fixed delay and then yields the
//! same three items every time.

use crate::types::Todo;
use composable_state_core::{DataSource, SourceFuture};
use std::time::Duration;

/// Delay used when none is configured
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// The items every fetch yields, in order
#[must_use]
pub fn fixture_todos() -> Vec<Todo> {
    vec![
        Todo::new("123", "The first"),
        Todo::new("456", "The second"),
        Todo::new("789", "The third"),
    ]
}

/// In-memory todo source with simulated latency
#[derive(Debug, Clone, Copy)]
pub struct TodoApi {
    delay: Duration,
}

impl TodoApi {
    /// Creates a source that answers after `delay`
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Configured latency
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for TodoApi {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY)
    }
}

impl DataSource<Vec<Todo>> for TodoApi {
    fn fetch(&self) -> SourceFuture<'_, Vec<Todo>> {
        let delay = self.delay;
        Box::pin(async move {
            tracing::debug!(?delay, "Fetching todos");
            tokio::time::sleep(delay).await;
            Ok(fixture_todos())
        })
    }
}
