//! Domain types for the Todo example.
//!
//! The screen state is a single record: a loading flag, the loaded items,
//! and the message of the last failed load. The item list is held as
//! `Arc<[Todo]>` so patches that leave it alone keep its identity and the
//! list view is not re-rendered.

use composable_state_macros::Record;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Identifier, unique within a loaded list
    pub id: String,
    /// Display text
    pub title: String,
    /// Completion flag
    pub complete: bool,
}

impl Todo {
    /// Creates an incomplete todo
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            complete: false,
        }
    }
}

/// State of the todo screen
///
/// `#[derive(Record)]` generates [`TodosStatePatch`] for
/// [`StateStore::patch_state`](composable_state_runtime::StateStore::patch_state).
#[derive(Record, Clone, Debug, Serialize)]
pub struct TodosState {
    /// True while a load is in flight
    pub loading: bool,
    /// Loaded items, in source order
    pub todos: Arc<[Todo]>,
    /// Message of the most recent failed load
    pub error: Option<String>,
}

impl TodosState {
    /// Not loading, no items, no error
    #[must_use]
    pub fn new() -> Self {
        Self {
            loading: false,
            todos: Arc::from(Vec::new()),
            error: None,
        }
    }

    /// Number of loaded items
    #[must_use]
    pub fn count(&self) -> usize {
        self.todos.len()
    }

    /// Titles of the loaded items, in order
    #[must_use]
    pub fn titles(&self) -> Vec<&str> {
        self.todos.iter().map(|todo| todo.title.as_str()).collect()
    }
}

impl Default for TodosState {
    fn default() -> Self {
        Self::new()
    }
}
