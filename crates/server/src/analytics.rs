//! Popularity listings for the analytics view.
//!
//! Ranks products by the engagement score from `ranking::scoring`, the same
//! formula every other caller uses.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use catalog::{CategoryId, Product};
use ranking::rank_by_engagement;
use store::{ProductStore, StoreFilter};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularProduct {
    pub product: Product,
    pub score: f64,
}

/// Top products by engagement, as of `generated_at`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularityReport {
    pub category: Option<CategoryId>,
    pub generated_at: DateTime<Utc>,
    /// How many products were scored
    pub candidates: usize,
    pub entries: Vec<PopularProduct>,
}

impl PopularityReport {
    /// Rank every product (optionally one category) and keep the top `limit`.
    #[instrument(skip(store), fields(store = store.name()))]
    pub async fn build(
        store: &dyn ProductStore,
        category: Option<&str>,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let mut filter = StoreFilter::new();
        if let Some(category) = category {
            filter = filter.with_category(category);
        }

        let products = store.query_all_matching(&filter).await?;
        let candidates = products.len();

        let entries = tokio::task::spawn_blocking(move || {
            rank_by_engagement(products, now)
                .into_iter()
                .take(limit)
                .map(|scored| PopularProduct {
                    product: scored.item,
                    score: scored.score,
                })
                .collect::<Vec<_>>()
        })
        .await?;

        info!("Popularity report: {} of {} products", entries.len(), candidates);

        Ok(Self {
            category: category.map(str::to_string),
            generated_at: now,
            candidates,
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
