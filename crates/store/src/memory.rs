//! Product store backed by an in-memory catalog.
//!
//! Used by the CLI, the benchmarks and the integration tests. It honours
//! the same contract a database-backed store would: inclusive date bound,
//! primary then secondary ordering, offset/limit slicing.

use crate::error::Result;
use crate::filter_pipeline::CandidateFilterPipeline;
use crate::traits::ProductStore;
use crate::types::{OrderBy, StoreFilter};
use async_trait::async_trait;
use catalog::{Product, ProductCatalog};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Serves queries from a shared, read-only `ProductCatalog`.
#[derive(Clone)]
pub struct InMemoryProductStore {
    /// Shared reference to the catalog (read-only, so no Mutex needed)
    catalog: Arc<ProductCatalog>,
}

impl InMemoryProductStore {
    pub fn new(catalog: Arc<ProductCatalog>) -> Self {
        Self { catalog }
    }

    /// Build a store from a snapshot file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let catalog = ProductCatalog::load_from_file(path)?;
        Ok(Self::new(Arc::new(catalog)))
    }

    pub fn catalog(&self) -> &Arc<ProductCatalog> {
        &self.catalog
    }

    /// Every product matching `filter`.
    ///
    /// The category index narrows the scan before the filter pipeline runs.
    fn matching(&self, filter: &StoreFilter) -> Result<Vec<Product>> {
        let candidates: Vec<Product> = match &filter.category {
            Some(category) => self
                .catalog
                .get_products_by_category(category)
                .iter()
                .filter_map(|id| self.catalog.get_product(id))
                .cloned()
                .collect(),
            None => self.catalog.products().cloned().collect(),
        };

        CandidateFilterPipeline::for_store_filter(filter).apply(candidates)
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    fn name(&self) -> &str {
        "InMemoryProductStore"
    }

    #[instrument(skip(self))]
    async fn count_matching(&self, filter: &StoreFilter) -> Result<u64> {
        let count = self.matching(filter)?.len() as u64;
        debug!("{} products match", count);
        Ok(count)
    }

    #[instrument(skip(self), fields(order_by = %order_by, then_by = %then_by))]
    async fn query_page(
        &self,
        filter: &StoreFilter,
        order_by: OrderBy,
        then_by: OrderBy,
        offset: u64,
        limit: usize,
    ) -> Result<Vec<Product>> {
        let mut products = self.matching(filter)?;

        // Id as a final key keeps equal rows in a stable order across calls
        products.sort_by(|a, b| {
            order_by
                .compare(a, b)
                .then_with(|| then_by.compare(a, b))
                .then_with(|| a.id.cmp(&b.id))
        });

        let offset = usize::try_from(offset).unwrap_or(usize::MAX);
        let page: Vec<Product> = products.into_iter().skip(offset).take(limit).collect();
        debug!("Returning {} products", page.len());
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn query_all_matching(&self, filter: &StoreFilter) -> Result<Vec<Product>> {
        let products = self.matching(filter)?;
        debug!("Returning all {} matching products", products.len());
        Ok(products)
    }
}
