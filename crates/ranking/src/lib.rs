//! Feed ranking primitives.
//!
//! This crate provides:
//! - Filter parameter resolution (`RawFilterParams` -> `FilterDescriptor`)
//! - Canonical query strings for feed links
//! - The trending and engagement score formulas, with parallel batch ranking
//! - Date-range lower bounds
//!
//! Everything here is pure. Callers pass the evaluation instant in.
//!
//! ## Example Usage
//! ```ignore
//! use ranking::{resolve_filters, RawFilterParams, rank_by_trending};
//!
//! let descriptor = resolve_filters(&RawFilterParams::from_query_str("sort=trending&page=2"));
//! let ranked = rank_by_trending(candidates, now);
//! let next = descriptor.page_link(descriptor.page() + 1);
//! ```

pub mod date_range;
pub mod params;
pub mod query_string;
pub mod scoring;

// Re-export main types
pub use date_range::{DayBoundary, DayBoundaryParseError};
pub use params::{
    resolve_filters, DateRange, FilterDescriptor, FilterResolver, RawFilterParams, SortMode,
    DEFAULT_PAGE_SIZE,
};
pub use query_string::{build_query_string, QueryParams};
pub use scoring::{
    engagement_score, rank_by, rank_by_engagement, rank_by_trending, trending_score,
    EngagementSignals, Scorable, ScoredItem,
};
