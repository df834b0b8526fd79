//! Filter implementations for the in-memory product store.
//!
//! Each one enforces a single `StoreFilter` constraint.

pub mod category;
pub mod created_after;

// Re-export for convenience
pub use category::CategoryFilter;
pub use created_after::CreatedAfterFilter;
