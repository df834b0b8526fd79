//! Filter to keep only products listed under one category.

use crate::error::Result;
use crate::traits::CandidateFilter;
use catalog::{CategoryId, Product};

/// Keeps candidates whose `category_ids` contain the category.
///
/// An unknown category simply matches nothing; validating the category
/// against the real set is not this filter's job.
pub struct CategoryFilter {
    category: CategoryId,
}

impl CategoryFilter {
    pub fn new(category: impl Into<CategoryId>) -> Self {
        Self {
            category: category.into(),
        }
    }
}

impl CandidateFilter for CategoryFilter {
    fn name(&self) -> &str {
        "CategoryFilter"
    }

    fn apply(&self, candidates: Vec<Product>) -> Result<Vec<Product>> {
        let filtered: Vec<Product> = candidates
            .into_iter()
            .filter(|candidate| candidate.in_category(&self.category))
            .collect();
        Ok(filtered)
    }
}
