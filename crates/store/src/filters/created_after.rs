//! Filter for the feed's date range.
//!
//! Drops products submitted before the range's lower bound.

use crate::error::Result;
use crate::traits::CandidateFilter;
use catalog::Product;
use chrono::{DateTime, Utc};

/// Keeps candidates created at or after `bound`.
pub struct CreatedAfterFilter {
    bound: DateTime<Utc>,
}

impl CreatedAfterFilter {
    pub fn new(bound: DateTime<Utc>) -> Self {
        Self { bound }
    }
}

impl CandidateFilter for CreatedAfterFilter {
    fn name(&self) -> &str {
        "CreatedAfterFilter"
    }

    fn apply(&self, candidates: Vec<Product>) -> Result<Vec<Product>> {
        let filtered: Vec<Product> = candidates
            .into_iter()
            .filter(|candidate| candidate.created_at >= self.bound)
            .collect();

        Ok(filtered)
    }
}
