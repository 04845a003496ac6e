//! Todo demo binary.
//!
//! Builds the store, mounts the list view, triggers one load and prints a
//! frame on every repaint until loading finishes.

use composable_state_runtime::metrics::describe_metrics;
use std::sync::Arc;
use todo::{AppConfig, Frame, TodoApi, TodoListView, TodoStore, TodosState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("todo=info,composable_state_runtime=info")),
        )
        .init();
    describe_metrics();

    let config = AppConfig::from_env()?;
    tracing::info!(api_delay = ?config.api_delay, "Starting todo demo");

    let todos = TodoStore::new(TodosState::default(), Arc::new(TodoApi::new(config.api_delay)));
    let mut view = TodoListView::new(&todos);
    view.mount();
    paint(&view.render());

    let load = todos.load_todos();
    let settled = view.repaint_until_settled(paint).await;
    tracing::debug!(%settled, "Load settled");

    load.await?;
    view.unmount();
    Ok(())
}

fn paint(frame: &Frame) {
    println!("=== Todos ===");
    println!("{frame}");
    println!();
}
