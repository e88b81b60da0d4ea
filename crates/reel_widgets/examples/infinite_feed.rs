//! Infinite Feed Example
//!
//! Simulates a feed of fixed-height rows backed by a slow "network". A
//! scripted user pulls to refresh, then flings towards the bottom until the
//! feed runs out of pages.
//!
//! Features demonstrated:
//! - LoadOperations resolved from spawned tasks
//! - Basic pull-to-refresh through the controller's PullHandle
//! - Load-more firing at the end of content and stopping on the last page
//!
//! Run with: RUST_LOG=reel_widgets=debug cargo run -p reel_widgets --example infinite_feed

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{ensure, Result};
use reel_widgets::prelude::*;
use tracing_subscriber::EnvFilter;

const ROW_HEIGHT: f32 = 48.0;
const PAGE_SIZE: usize = 20;
const TOTAL_ROWS: usize = 90;

/// Row storage shared between the feed and the UI
struct Rows {
    items: Mutex<Vec<String>>,
    view: Arc<ScrollView>,
}

impl Rows {
    fn replace(&self, items: Vec<String>) {
        let count = items.len();
        *self.items.lock().unwrap() = items;
        self.view.set_content_extent(count as f32 * ROW_HEIGHT);
    }

    fn append(&self, items: Vec<String>) {
        let count = {
            let mut rows = self.items.lock().unwrap();
            rows.extend(items);
            rows.len()
        };
        self.view.set_content_extent(count as f32 * ROW_HEIGHT);
    }

    fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }
}

struct SlowFeed {
    rows: Arc<Rows>,
    latency: Duration,
}

fn page(start: usize) -> Vec<String> {
    (start..(start + PAGE_SIZE).min(TOTAL_ROWS))
        .map(|i| format!("Post #{i}"))
        .collect()
}

impl LoadOperations for SlowFeed {
    fn refresh_all(&self, completion: LoadCompletion) {
        let rows = self.rows.clone();
        let latency = self.latency;
        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            rows.replace(page(0));
            tracing::info!("refreshed: {} rows", rows.len());
            completion.complete(rows.len() < TOTAL_ROWS);
        });
    }

    fn load_more(&self, completion: LoadCompletion) {
        let rows = self.rows.clone();
        let latency = self.latency;
        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            rows.append(page(rows.len()));
            tracing::info!("loaded more: {} rows", rows.len());
            completion.complete(rows.len() < TOTAL_ROWS);
        });
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let view = Arc::new(ScrollView::new(0.0, 600.0));
    let rows = Arc::new(Rows {
        items: Mutex::new(Vec::new()),
        view: view.clone(),
    });
    let feed = Arc::new(SlowFeed {
        rows: rows.clone(),
        latency: Duration::from_millis(150),
    });

    let controller = PaginationController::new(&view, &feed);
    controller.configure(RefreshMode::Basic);

    // Pull to refresh
    let handle = controller
        .pull_handle()
        .ok_or_else(|| anyhow::anyhow!("basic mode has no pull handle"))?;
    handle.pull(80.0);
    handle.release();
    wait_idle(&controller).await;

    // Fling towards the bottom until the feed is exhausted
    let mut offset = 0.0;
    while controller.has_more_data() {
        offset += 240.0;
        view.drag_to(offset);
        tracing::debug!("user scrolled to {:.0}", view.geometry().offset);
        wait_idle(&controller).await;
        tokio::time::sleep(Duration::from_millis(16)).await;
    }
    view.end_drag();

    ensure!(rows.len() == TOTAL_ROWS, "expected {TOTAL_ROWS} rows, got {}", rows.len());
    tracing::info!(
        "feed exhausted after {} transitions: {:?}",
        controller.transition_history().len(),
        controller
    );
    Ok(())
}

async fn wait_idle(controller: &PaginationController) {
    while controller.is_loading() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
