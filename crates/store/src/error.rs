//! Error types for product stores.

use catalog::CatalogError;
use thiserror::Error;

/// Failures a product store can report.
///
/// The feed engine passes these through unchanged; an empty result is
/// never used to signal a failure.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store cannot be reached
    #[error("Product store unavailable: {0}")]
    Unavailable(String),

    /// The store was reachable but the query failed
    #[error("Product store query failed: {0}")]
    QueryFailed(String),

    /// The catalog backing an in-memory store could not be loaded
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
