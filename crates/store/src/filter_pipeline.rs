//! Chains candidate filters together.
//!
//! The in-memory store builds one pipeline per query from the pushed-down
//! `StoreFilter`.

use crate::error::Result;
use crate::filters::{CategoryFilter, CreatedAfterFilter};
use crate::traits::CandidateFilter;
use crate::types::StoreFilter;
use catalog::Product;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = CandidateFilterPipeline::new()
///     .add_filter(CategoryFilter::new("ai"))
///     .add_filter(CreatedAfterFilter::new(week_ago));
///
/// let matching = pipeline.apply(products)?;
/// ```
pub struct CandidateFilterPipeline {
    filters: Vec<Box<dyn CandidateFilter>>,
}

impl CandidateFilterPipeline {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Pipeline enforcing every constraint in `filter`.
    pub fn for_store_filter(filter: &StoreFilter) -> Self {
        let mut pipeline = Self::new();
        if let Some(category) = &filter.category {
            pipeline = pipeline.add_filter(CategoryFilter::new(category.clone()));
        }
        if let Some(bound) = filter.created_after {
            pipeline = pipeline.add_filter(CreatedAfterFilter::new(bound));
        }
        pipeline
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl CandidateFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Apply all filters in sequence to the candidates.
    pub fn apply(&self, candidates: Vec<Product>) -> Result<Vec<Product>> {
        let mut current = candidates;
        for filter in &self.filters {
            tracing::trace!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current)?;
            tracing::trace!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }
}

impl Default for CandidateFilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn products() -> Vec<Product> {
        vec![
            Product::new("old-ai", "old-ai", Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
                .with_category("ai"),
            Product::new("new-ai", "new-ai", Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())
                .with_category("ai"),
            Product::new("new-games", "new-games", Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())
                .with_category("games"),
        ]
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = CandidateFilterPipeline::new();
        let filtered = pipeline.apply(products()).unwrap();
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_pipeline_from_store_filter() {
        let filter = StoreFilter::new()
            .with_category("ai")
            .with_created_after(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());

        let pipeline = CandidateFilterPipeline::for_store_filter(&filter);
        assert_eq!(pipeline.len(), 2);

        let filtered = pipeline.apply(products()).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "new-ai");
    }

    #[test]
    fn test_unconstrained_store_filter_builds_empty_pipeline() {
        let pipeline = CandidateFilterPipeline::for_store_filter(&StoreFilter::new());
        assert!(pipeline.is_empty());
    }
}
