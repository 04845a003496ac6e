//! Todo example: a delayed load bound to a text view.
//!
//! The screen holds a [`TodosState`] in a [`TodoStore`]. Triggering
//! [`TodoStore::load_todos`] flips the loading flag, waits on the mock
//! [`TodoApi`], then fills in the items. A [`TodoListView`] follows the
//! store through view bindings and repaints only when a slice it shows
//! changes.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use todo::{TodoApi, TodoListView, TodoStore, TodosState};
//!
//! # async fn example() {
//! let todos = TodoStore::new(TodosState::default(), Arc::new(TodoApi::default()));
//! let mut view = TodoListView::new(&todos);
//! view.mount();
//!
//! let load = todos.load_todos();
//! let settled = view.repaint_until_settled(|frame| println!("{frame}")).await;
//!
//! let _ = load.await;
//! assert_eq!(settled, view.render());
//! # }
//! ```

pub mod api;
pub mod config;
pub mod store;
pub mod types;
pub mod view;

pub use api::{TodoApi, fixture_todos};
pub use config::{AppConfig, ConfigError};
pub use store::{Screen, TodoSource, TodoStore};
pub use types::{Todo, TodosState, TodosStatePatch};
pub use view::{Frame, TodoItemView, TodoListView};
