//! End-to-end tests for the todo load flow.

use composable_state_core::{SourceError, projector};
use composable_state_testing::properties::arb_title;
use composable_state_testing::{
    FailingSource, ManualSource, Recorder, StaticSource, StoreTest, init_test_tracing,
};
use proptest::collection::vec;
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use todo::{
    Frame, Todo, TodoApi, TodoListView, TodoStore, TodosState, TodosStatePatch, fixture_todos,
};

fn three_titles() -> Frame {
    Frame::List(vec![
        "- The first".to_string(),
        "- The second".to_string(),
        "- The third".to_string(),
    ])
}

#[tokio::test(start_paused = true)]
async fn test_load_emits_loading_then_items() {
    init_test_tracing();
    let todos = TodoStore::new(TodosState::default(), Arc::new(TodoApi::default()));
    let states = Recorder::new();
    let _sub = states.attach(&todos.store().select_all());

    assert!(todos.load_todos().await.is_ok());

    let seen = states.values();
    assert_eq!(seen.len(), 2);
    assert!(seen[0].loading);
    assert_eq!(seen[0].count(), 0);
    assert!(!seen[1].loading);
    assert_eq!(seen[1].titles(), vec!["The first", "The second", "The third"]);
}

#[tokio::test(start_paused = true)]
async fn test_view_shows_indicator_then_titles() {
    init_test_tracing();
    let todos = TodoStore::new(TodosState::default(), Arc::new(TodoApi::default()));
    let mut view = TodoListView::new(&todos);
    view.mount();
    assert_eq!(view.render(), Frame::List(Vec::new()));

    let load = todos.load_todos();
    let mut frames = Vec::new();
    let settled = view
        .repaint_until_settled(|frame| frames.push(frame.clone()))
        .await;
    assert!(load.await.is_ok());

    assert_eq!(settled, three_titles());
    assert_eq!(frames, vec![Frame::Loading, three_titles()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_settled_frame_is_consistent_across_workers() {
    for _ in 0..500 {
        let todos = TodoStore::new(
            TodosState::default(),
            Arc::new(TodoApi::new(Duration::from_micros(50))),
        );
        let mut view = TodoListView::new(&todos);
        view.mount();

        let load = todos.load_todos();
        let settled = view.repaint_until_settled(|_| {}).await;
        assert!(load.await.is_ok());

        assert_eq!(settled, three_titles());
    }
}

#[test]
fn test_loading_flag_emitted_once_per_change() {
    StoreTest::new()
        .given_state(TodosState::default())
        .observing(projector(|s: &Arc<TodosState>| s.loading))
        .when(|store| store.patch_state(TodosStatePatch::default().with_loading(true)))
        .when(|store| store.patch_state(TodosStatePatch::default().with_loading(true)))
        .when(|store| {
            store.patch_state(
                TodosStatePatch::default()
                    .with_loading(false)
                    .with_todos(fixture_todos()),
            );
        })
        .then_state(|state| {
            assert!(!state.loading);
            assert_eq!(state.count(), 3);
        })
        .then_emissions(|emitted| assert_eq!(emitted, &[true, false]))
        .run();
}

#[tokio::test]
async fn test_loaded_items_replace_previous_list() {
    let todos = TodoStore::new(
        TodosState::default(),
        Arc::new(StaticSource::new(vec![Todo::new("1", "Only")])),
    );
    todos
        .store()
        .patch_state(TodosStatePatch::default().with_todos(fixture_todos()));

    assert!(todos.load_todos().await.is_ok());

    assert_eq!(todos.store().state().titles(), vec!["Only"]);
}

proptest! {
    #[test]
    fn rendered_lines_follow_item_order(titles in vec(arb_title(), 0..8)) {
        let items: Vec<Todo> = titles
            .iter()
            .enumerate()
            .map(|(index, title)| Todo::new(index.to_string(), title.clone()))
            .collect();
        let todos = TodoStore::new(TodosState::default(), Arc::new(StaticSource::new(Vec::new())));
        let mut view = TodoListView::new(&todos);
        view.mount();

        todos.store().patch_state(TodosStatePatch::default().with_todos(items));

        let expected: Vec<String> = titles.iter().map(|title| format!("- {title}")).collect();
        prop_assert_eq!(view.render(), Frame::List(expected));
    }
}

#[tokio::test]
async fn test_overlapping_loads_settle_on_last_result() {
    init_test_tracing();
    let source = ManualSource::new();
    let todos = TodoStore::new(TodosState::default(), Arc::new(source.clone()));

    let first = todos.load_todos();
    let second = todos.load_todos();
    while source.started() < 2 {
        tokio::task::yield_now().await;
    }

    let later = vec![fixture_todos()[0].clone()];
    assert!(source.resolve(1, fixture_todos()));
    assert!(second.await.is_ok());
    assert!(!todos.store().state().loading);

    assert!(source.resolve(0, later));
    assert!(first.await.is_ok());

    let state = todos.store().state();
    assert!(!state.loading);
    assert_eq!(state.titles(), vec!["The first"]);
}

#[tokio::test(start_paused = true)]
async fn test_repeated_loads_never_stick_in_loading() {
    let todos = TodoStore::new(
        TodosState::default(),
        Arc::new(TodoApi::new(Duration::from_millis(50))),
    );

    let handles: Vec<_> = (0..5).map(|_| todos.load_todos()).collect();
    for handle in handles {
        assert!(handle.await.is_ok());
    }

    let state = todos.store().state();
    assert!(!state.loading);
    assert_eq!(state.count(), 3);
}

#[tokio::test]
async fn test_failed_load_renders_error() {
    let todos = TodoStore::new(
        TodosState::default(),
        Arc::new(FailingSource::new(SourceError::Timeout(Duration::from_secs(5)))),
    );
    let mut view = TodoListView::new(&todos);
    view.mount();

    assert!(todos.load_todos().await.is_ok());

    assert_eq!(
        view.render(),
        Frame::Error("Data source timed out after 5s".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn test_unmounted_view_stops_following() {
    let todos = TodoStore::new(TodosState::default(), Arc::new(TodoApi::default()));
    let mut view = TodoListView::new(&todos);
    view.mount();

    let load = todos.load_todos();
    assert_eq!(view.render(), Frame::Loading);

    view.unmount();
    assert_eq!(todos.store().subscriber_count(), 0);
    assert!(load.await.is_ok());

    assert!(!todos.store().state().loading);
    assert_eq!(view.render(), Frame::Loading);
}

#[tokio::test(start_paused = true)]
async fn test_loading_selection_as_stream() {
    let todos = TodoStore::new(TodosState::default(), Arc::new(TodoApi::default()));
    let mut loading = todos.loading().into_stream();

    let load = todos.load_todos();
    assert_eq!(loading.next_value().await, Ok(true));
    assert_eq!(loading.next_value().await, Ok(false));
    assert!(load.await.is_ok());
}
