//! Text rendering of the todo screen.
//!
//! [`TodoListView`] is the list component: it holds a [`ViewBinding`] over
//! everything it displays and a [`Notify`] that is signalled whenever that
//! changes. A render loop waits on [`changed`](TodoListView::changed) and
//! paints [`render`](TodoListView::render).

use crate::store::{Screen, TodoStore};
use crate::types::{Todo, TodosState};
use composable_state_runtime::ViewBinding;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Notify;

/// One painted frame of the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A load is in flight
    Loading,
    /// The last load failed
    Error(String),
    /// Item lines, in order
    List(Vec<String>),
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str("Loading..."),
            Self::Error(message) => write!(f, "Error: {message}"),
            Self::List(lines) => f.write_str(&lines.join("\n")),
        }
    }
}

/// A single list entry; shows only the title
#[derive(Debug, Clone, Copy)]
pub struct TodoItemView<'a> {
    todo: &'a Todo,
}

impl<'a> TodoItemView<'a> {
    /// Wraps `todo` for display
    #[must_use]
    pub const fn new(todo: &'a Todo) -> Self {
        Self { todo }
    }

    /// The rendered line
    #[must_use]
    pub fn render(&self) -> String {
        format!("- {}", self.todo.title)
    }
}

/// The todo list component
///
/// Paints from one binding over the whole [`Screen`], so a frame never mixes
/// the loading flag of one state with the items of another.
pub struct TodoListView {
    screen: ViewBinding<TodosState, Screen>,
    invalidated: Arc<Notify>,
}

impl TodoListView {
    /// Creates an unmounted view reading from `store`
    ///
    /// The first frame is available immediately through
    /// [`render`](Self::render).
    #[must_use]
    pub fn new(store: &TodoStore) -> Self {
        Self {
            screen: ViewBinding::new(store.store().clone(), store.screen_projector()),
            invalidated: Arc::new(Notify::new()),
        }
    }

    /// Start following the store
    pub fn mount(&mut self) {
        let signal = Arc::clone(&self.invalidated);
        self.screen.mount(move || signal.notify_one());
    }

    /// Stop following the store
    pub fn unmount(&mut self) {
        self.screen.unmount();
    }

    /// Returns true while mounted
    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        self.screen.is_mounted()
    }

    /// Point the view at another store
    ///
    /// Returns false if it already reads from `store`.
    pub fn rebind(&mut self, store: &TodoStore) -> bool {
        self.screen
            .rebind(store.store().clone(), store.screen_projector())
    }

    /// Wait until a displayed value changes
    ///
    /// A change that happened since the last wait completes immediately.
    pub async fn changed(&self) {
        self.invalidated.notified().await;
    }

    /// Repaint on every change until a frame other than
    /// [`Frame::Loading`] is painted, and return that frame
    pub async fn repaint_until_settled<F>(&self, mut paint: F) -> Frame
    where
        F: FnMut(&Frame),
    {
        loop {
            self.changed().await;
            let frame = self.render();
            paint(&frame);
            if frame != Frame::Loading {
                return frame;
            }
        }
    }

    /// Paint the current frame
    #[must_use]
    pub fn render(&self) -> Frame {
        let (loading, todos, error) = self.screen.get();
        if loading {
            return Frame::Loading;
        }
        if let Some(message) = error {
            return Frame::Error(message);
        }
        Frame::List(
            todos
                .iter()
                .map(|todo| TodoItemView::new(todo).render())
                .collect(),
        )
    }
}

impl fmt::Debug for TodoListView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TodoListView")
            .field("mounted", &self.is_mounted())
            .field("frame", &self.render())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fixture_todos;
    use crate::types::TodosStatePatch;
    use composable_state_testing::StaticSource;

    fn todo_store() -> TodoStore {
        TodoStore::new(TodosState::default(), Arc::new(StaticSource::new(fixture_todos())))
    }

    #[test]
    fn test_item_renders_title_only() {
        let todo = Todo::new("123", "The first");
        assert_eq!(TodoItemView::new(&todo).render(), "- The first");
    }

    #[test]
    fn test_frame_display() {
        assert_eq!(Frame::Loading.to_string(), "Loading...");
        assert_eq!(Frame::Error("boom".to_string()).to_string(), "Error: boom");
        assert_eq!(
            Frame::List(vec!["- a".to_string(), "- b".to_string()]).to_string(),
            "- a\n- b"
        );
    }

    #[test]
    fn test_first_frame_without_mount() {
        let store = todo_store();
        let view = TodoListView::new(&store);

        assert_eq!(view.render(), Frame::List(Vec::new()));
        assert!(!view.is_mounted());
    }

    #[test]
    fn test_mounted_view_follows_store() {
        let store = todo_store();
        let mut view = TodoListView::new(&store);
        view.mount();

        store
            .store()
            .patch_state(TodosStatePatch::default().with_loading(true));
        assert_eq!(view.render(), Frame::Loading);

        store.store().patch_state(
            TodosStatePatch::default()
                .with_loading(false)
                .with_error(Some("offline".to_string())),
        );
        assert_eq!(view.render(), Frame::Error("offline".to_string()));
    }

    #[test]
    fn test_rebind_same_store_is_noop() {
        let store = todo_store();
        let mut view = TodoListView::new(&store);
        view.mount();

        assert!(!view.rebind(&store));
        assert_eq!(store.store().subscriber_count(), 1);

        let other = todo_store();
        assert!(view.rebind(&other));
        assert_eq!(store.store().subscriber_count(), 0);
        assert_eq!(other.store().subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_change_wakes_render_loop() {
        let store = todo_store();
        let mut view = TodoListView::new(&store);
        view.mount();

        store
            .store()
            .patch_state(TodosStatePatch::default().with_loading(true));

        let woke = tokio::time::timeout(std::time::Duration::from_secs(1), view.changed()).await;
        assert!(woke.is_ok());
        assert_eq!(view.render(), Frame::Loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repaint_until_settled_paints_each_frame() {
        let store = TodoStore::new(
            TodosState::default(),
            Arc::new(StaticSource::new(fixture_todos()).with_delay(std::time::Duration::from_millis(10))),
        );
        let mut view = TodoListView::new(&store);
        view.mount();

        let load = store.load_todos();
        let mut painted = Vec::new();
        let settled = view.repaint_until_settled(|frame| painted.push(frame.clone())).await;
        assert!(load.await.is_ok());

        assert_eq!(settled.to_string(), "- The first\n- The second\n- The third");
        assert_eq!(painted, vec![Frame::Loading, settled]);
    }
}
