//! # Feed Orchestrator
//!
//! Turns a resolved `FilterDescriptor` into one page of the product feed:
//! 1. Build the store filter (category + date lower bound)
//! 2. Column sorts (`Top`, `New`, `Discussed`): count and page queries run
//!    concurrently, ordering and slicing pushed down to the store
//! 3. `Trending`: fetch the whole filtered set, score it against one
//!    instant on the blocking pool, sort, slice in memory
//! 4. Attach pagination metadata computed from the total
//!
//! Store errors are returned as they are. A failing store never turns into
//! an empty page.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use catalog::Product;
use ranking::{FilterDescriptor, FilterResolver, SortMode, rank_by_trending};
use store::{OrderBy, ProductStore, SortColumn, StoreFilter};

use crate::config::FeedConfig;
use crate::error::Result;

/// Secondary order for every column sort.
const NEWEST_FIRST: OrderBy = OrderBy::desc(SortColumn::CreatedAt);

/// One page of the feed plus everything needed to render pagination.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPage {
    pub docs: Vec<Product>,
    pub total_docs: u64,
    pub total_pages: u64,
    pub page: u32,
    pub page_size: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub next_page: Option<u32>,
    pub prev_page: Option<u32>,
    /// The instant every score and date bound on this page was computed against
    pub evaluated_at: DateTime<Utc>,
}

impl RankedPage {
    /// Build a page and derive its metadata from `total_docs`.
    ///
    /// A page past the end keeps accurate totals; `prev_page` still points
    /// one page back.
    pub fn new(
        docs: Vec<Product>,
        total_docs: u64,
        page: u32,
        page_size: usize,
        evaluated_at: DateTime<Utc>,
    ) -> Self {
        let total_pages = total_docs.div_ceil(page_size.max(1) as u64);
        let next_page = if u64::from(page) < total_pages {
            page.checked_add(1)
        } else {
            None
        };
        let prev_page = if page > 1 { Some(page - 1) } else { None };

        Self {
            docs,
            total_docs,
            total_pages,
            page,
            page_size,
            has_next_page: next_page.is_some(),
            has_prev_page: prev_page.is_some(),
            next_page,
            prev_page,
            evaluated_at,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

/// Entry point for ranked feed pages.
///
/// Cheap to clone; clones share the store.
#[derive(Clone)]
pub struct FeedOrchestrator {
    store: Arc<dyn ProductStore>,
    config: FeedConfig,
}

impl FeedOrchestrator {
    pub fn new(store: Arc<dyn ProductStore>, config: FeedConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ProductStore> {
        &self.store
    }

    /// Resolver using this orchestrator's configured page size.
    pub fn resolver(&self) -> FilterResolver {
        self.config.resolver()
    }

    /// Rank one page of the feed as of now.
    pub async fn get_ranked_page(&self, descriptor: &FilterDescriptor) -> Result<RankedPage> {
        self.get_ranked_page_at(descriptor, Utc::now()).await
    }

    /// Rank one page of the feed as of `now`.
    ///
    /// `now` feeds both the date-range bound and the trending scores.
    #[instrument(
        skip(self, descriptor),
        fields(
            sort = %descriptor.sort_mode(),
            date = %descriptor.date_range(),
            page = descriptor.page(),
            category = descriptor.category().unwrap_or("*"),
        )
    )]
    pub async fn get_ranked_page_at(
        &self,
        descriptor: &FilterDescriptor,
        now: DateTime<Utc>,
    ) -> Result<RankedPage> {
        let start_time = Instant::now();
        let filter = self.store_filter(descriptor, now);

        let (total_docs, docs) = match store_order(descriptor.sort_mode()) {
            Some(order_by) => self.store_sorted_page(&filter, order_by, descriptor).await?,
            None => self.trending_page(&filter, descriptor, now).await?,
        };

        let page = RankedPage::new(
            docs,
            total_docs,
            descriptor.page(),
            descriptor.page_size(),
            now,
        );

        debug!(
            "Ranked page {}/{} ({} docs of {}) in {:.2?}",
            page.page,
            page.total_pages,
            page.docs.len(),
            page.total_docs,
            start_time.elapsed()
        );
        Ok(page)
    }

    fn store_filter(&self, descriptor: &FilterDescriptor, now: DateTime<Utc>) -> StoreFilter {
        StoreFilter {
            category: descriptor.category().map(str::to_string),
            created_after: descriptor
                .date_range()
                .lower_bound(now, self.config.day_boundary),
        }
    }

    /// Count and page in parallel; the store does ordering and slicing.
    ///
    /// The two queries may see different snapshots under concurrent writes.
    async fn store_sorted_page(
        &self,
        filter: &StoreFilter,
        order_by: OrderBy,
        descriptor: &FilterDescriptor,
    ) -> Result<(u64, Vec<Product>)> {
        let (total, docs) = tokio::try_join!(
            self.store.count_matching(filter),
            self.store.query_page(
                filter,
                order_by,
                NEWEST_FIRST,
                descriptor.offset(),
                descriptor.page_size(),
            ),
        )?;
        Ok((total, docs))
    }

    /// Score the full filtered set, then slice the requested page.
    async fn trending_page(
        &self,
        filter: &StoreFilter,
        descriptor: &FilterDescriptor,
        now: DateTime<Utc>,
    ) -> Result<(u64, Vec<Product>)> {
        let candidates = self.store.query_all_matching(filter).await?;
        let total = candidates.len() as u64;

        if candidates.len() > self.config.trending_warn_threshold {
            warn!(
                "Trending sort over {} candidates (threshold {}) from {}",
                candidates.len(),
                self.config.trending_warn_threshold,
                self.store.name()
            );
        }

        let offset = usize::try_from(descriptor.offset()).unwrap_or(usize::MAX);
        let limit = descriptor.page_size();

        // Scoring and sorting are CPU-bound; keep them off the async workers
        let docs = tokio::task::spawn_blocking(move || {
            rank_by_trending(candidates, now)
                .into_iter()
                .skip(offset)
                .take(limit)
                .map(|scored| scored.item)
                .collect::<Vec<_>>()
        })
        .await?;

        Ok((total, docs))
    }
}

/// Store-side ordering for a sort mode, or `None` when the order is
/// derived from a computed score.
fn store_order(mode: SortMode) -> Option<OrderBy> {
    match mode {
        SortMode::Top => Some(OrderBy::desc(SortColumn::Upvotes)),
        SortMode::New => Some(OrderBy::desc(SortColumn::CreatedAt)),
        SortMode::Discussed => Some(OrderBy::desc(SortColumn::CommentCount)),
        SortMode::Trending => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn docs(count: usize) -> Vec<Product> {
        (0..count)
            .map(|i| Product::new(format!("p{}", i), "p", now()))
            .collect()
    }

    // ============================================================================
    // Unit Tests: RankedPage metadata
    // ============================================================================

    #[test]
    fn test_first_of_several_pages() {
        let page = RankedPage::new(docs(12), 30, 1, 12, now());

        assert_eq!(page.total_pages, 3);
        assert!(page.has_next_page);
        assert!(!page.has_prev_page);
        assert_eq!(page.next_page, Some(2));
        assert_eq!(page.prev_page, None);
    }

    #[test]
    fn test_last_page() {
        let page = RankedPage::new(docs(6), 30, 3, 12, now());

        assert!(!page.has_next_page);
        assert!(page.has_prev_page);
        assert_eq!(page.next_page, None);
        assert_eq!(page.prev_page, Some(2));
    }

    #[test]
    fn test_empty_result() {
        let page = RankedPage::new(vec![], 0, 1, 12, now());

        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next_page);
        assert!(!page.has_prev_page);
        assert!(page.is_empty());
    }

    #[test]
    fn test_exact_multiple_of_page_size() {
        let page = RankedPage::new(docs(12), 24, 2, 12, now());
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_out_of_range_page() {
        let page = RankedPage::new(vec![], 30, 9, 12, now());

        assert_eq!(page.total_docs, 30);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_next_page);
        assert_eq!(page.prev_page, Some(8));
    }

    #[test]
    fn test_max_page_has_no_next() {
        let page = RankedPage::new(vec![], u64::MAX, u32::MAX, 1, now());
        assert_eq!(page.next_page, None);
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_serializes_camel_case() {
        let page = RankedPage::new(docs(1), 1, 1, 12, now());
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["totalDocs"], 1);
        assert_eq!(json["hasNextPage"], false);
        assert!(json["nextPage"].is_null());
        assert!(json.get("evaluatedAt").is_some());
    }

    #[test]
    fn test_store_order_per_mode() {
        assert_eq!(store_order(SortMode::Top), Some(OrderBy::desc(SortColumn::Upvotes)));
        assert_eq!(store_order(SortMode::New), Some(OrderBy::desc(SortColumn::CreatedAt)));
        assert_eq!(
            store_order(SortMode::Discussed),
            Some(OrderBy::desc(SortColumn::CommentCount))
        );
        assert_eq!(store_order(SortMode::Trending), None);
    }
}
