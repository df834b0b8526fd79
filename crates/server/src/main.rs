//! Simple test harness for the feed orchestrator.
//!
//! Loads a catalog snapshot and prints one ranked page for a query string:
//!
//! ```text
//! server data/catalog.json "sort=trending&date=week&page=2"
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use ranking::RawFilterParams;
use server::{FeedConfig, FeedOrchestrator};
use store::InMemoryProductStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,server=debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let catalog_path = PathBuf::from(args.next().unwrap_or_else(|| "data/catalog.json".to_string()));
    let query = args.next().unwrap_or_default();

    info!("Starting hobbyrider feed test harness");

    let config = FeedConfig::from_env().context("Invalid feed configuration")?;
    info!("Config: {:?}", config);

    info!("Loading catalog from {}...", catalog_path.display());
    let store = InMemoryProductStore::load_from_file(&catalog_path)
        .with_context(|| format!("Failed to load catalog from {}", catalog_path.display()))?;
    let orchestrator = FeedOrchestrator::new(Arc::new(store), config);

    let descriptor = orchestrator
        .resolver()
        .resolve(&RawFilterParams::from_query_str(&query));
    info!("Resolved {:?} to {:?}", query, descriptor);

    let page = orchestrator.get_ranked_page(&descriptor).await?;

    info!(
        "Page {} of {} ({} products total):",
        page.page, page.total_pages, page.total_docs
    );
    for (i, product) in page.docs.iter().enumerate() {
        let rank = descriptor.offset() + i as u64 + 1;
        info!(
            "{}. {} [{}] upvotes={} comments={} created={}",
            rank,
            product.name,
            product.id,
            product.upvotes,
            product.comment_count,
            product.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    if let Some(next) = page.next_page {
        info!("next: ?{}", descriptor.page_link(next));
    }
    if let Some(prev) = page.prev_page {
        info!("prev: ?{}", descriptor.page_link(prev));
    }

    Ok(())
}
