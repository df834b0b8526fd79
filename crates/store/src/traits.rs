//! Core traits for product stores and candidate filtering.

use crate::error::Result;
use crate::types::{OrderBy, StoreFilter};
use async_trait::async_trait;
use catalog::Product;

/// Read access to the products the feed ranks.
///
/// Implementations own all durable state. Separate calls are not
/// required to observe the same snapshot, so a count and a page fetched
/// concurrently may disagree slightly while writes land.
///
/// ## Design Note
/// - `Send + Sync` so one store can be shared by every request task
/// - Stores only need simple column ordering; derived scores are
///   computed by the caller on the full candidate set
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Returns the name of this store (for logging/debugging)
    fn name(&self) -> &str;

    /// Number of products matching `filter`.
    async fn count_matching(&self, filter: &StoreFilter) -> Result<u64>;

    /// One page of matching products ordered by `order_by`, ties broken by
    /// `then_by`.
    ///
    /// An offset past the end yields an empty vec, not an error.
    async fn query_page(
        &self,
        filter: &StoreFilter,
        order_by: OrderBy,
        then_by: OrderBy,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<Product>>;

    /// Every matching product, unordered.
    async fn query_all_matching(&self, filter: &StoreFilter) -> Result<Vec<Product>>;
}

/// One step of in-memory candidate filtering.
///
/// Filters take ownership of the candidates and return the survivors,
/// preserving input order.
pub trait CandidateFilter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    fn apply(&self, candidates: Vec<Product>) -> Result<Vec<Product>>;
}
