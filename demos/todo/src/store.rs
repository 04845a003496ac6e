//! Todo store: screen state plus the load action.

use crate::types::{Todo, TodosState, TodosStatePatch};
use composable_state_core::{DataSource, Projector, projector};
use composable_state_runtime::{Selection, StateStore, StoreConfig};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Shared todo source
pub type TodoSource = Arc<dyn DataSource<Vec<Todo>>>;

/// Everything the list view paints: loading flag, items and error message
///
/// Projected from a single state, so the three never disagree.
pub type Screen = (bool, Arc<[Todo]>, Option<String>);

/// State store for the todo screen, with its data source injected
///
/// Cloning shares the underlying store. The `todos` and `loading`
/// projectors are built once, so view bindings created from them can be
/// rebound without re-subscribing.
#[derive(Clone)]
pub struct TodoStore {
    store: StateStore<TodosState>,
    source: TodoSource,
    todos: Projector<TodosState, Arc<[Todo]>>,
    loading: Projector<TodosState, bool>,
    error: Projector<TodosState, Option<String>>,
    screen: Projector<TodosState, Screen>,
}

impl TodoStore {
    /// Creates a store holding `initial` that loads from `source`
    #[must_use]
    pub fn new(initial: TodosState, source: TodoSource) -> Self {
        Self {
            store: StateStore::with_config(initial, StoreConfig::default().with_label("todos")),
            source,
            todos: projector(|state: &Arc<TodosState>| Arc::clone(&state.todos)),
            loading: projector(|state: &Arc<TodosState>| state.loading),
            error: projector(|state: &Arc<TodosState>| state.error.clone()),
            screen: projector(|state: &Arc<TodosState>| {
                (state.loading, Arc::clone(&state.todos), state.error.clone())
            }),
        }
    }

    /// The underlying store, for arbitrary projections
    #[must_use]
    pub const fn store(&self) -> &StateStore<TodosState> {
        &self.store
    }

    /// Loaded items
    #[must_use]
    pub fn todos(&self) -> Selection<TodosState, Arc<[Todo]>> {
        self.store.select_with(self.todos_projector())
    }

    /// Loading flag
    #[must_use]
    pub fn loading(&self) -> Selection<TodosState, bool> {
        self.store.select_with(self.loading_projector())
    }

    /// Message of the last failed load
    #[must_use]
    pub fn error(&self) -> Selection<TodosState, Option<String>> {
        self.store.select_with(self.error_projector())
    }

    /// Projector behind [`todos`](Self::todos)
    #[must_use]
    pub fn todos_projector(&self) -> Projector<TodosState, Arc<[Todo]>> {
        Arc::clone(&self.todos)
    }

    /// Projector behind [`loading`](Self::loading)
    #[must_use]
    pub fn loading_projector(&self) -> Projector<TodosState, bool> {
        Arc::clone(&self.loading)
    }

    /// Projector behind [`error`](Self::error)
    #[must_use]
    pub fn error_projector(&self) -> Projector<TodosState, Option<String>> {
        Arc::clone(&self.error)
    }

    /// Projector of the whole painted [`Screen`]
    #[must_use]
    pub fn screen_projector(&self) -> Projector<TodosState, Screen> {
        Arc::clone(&self.screen)
    }

    /// Start loading todos from the data source
    ///
    /// Sets `loading` immediately, then fetches in a spawned task. On
    /// success the items replace the list and `loading` and `error` are
    /// cleared; on failure `loading` is cleared and `error` carries the
    /// message. Overlapping loads are not coordinated: whichever finishes
    /// last wins. Await the returned handle to wait for completion.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[tracing::instrument(skip(self), fields(store = %self.store.config().label))]
    pub fn load_todos(&self) -> JoinHandle<()> {
        self.store
            .patch_state(TodosStatePatch::default().with_loading(true));

        let store = self.store.clone();
        let source = Arc::clone(&self.source);
        tokio::spawn(
            async move {
                match source.fetch().await {
                    Ok(todos) => {
                        tracing::info!(count = todos.len(), "Todos loaded");
                        store.patch_state(
                            TodosStatePatch::default()
                                .with_todos(todos)
                                .with_loading(false)
                                .with_error(None::<String>),
                        );
                    }
                    Err(error) => {
                        tracing::warn!(%error, "Loading todos failed");
                        store.patch_state(
                            TodosStatePatch::default()
                                .with_loading(false)
                                .with_error(Some(error.to_string())),
                        );
                    }
                }
            }
            .in_current_span(),
        )
    }
}

impl std::fmt::Debug for TodoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoStore")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
