//! Error types for the feed engine.

use store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    /// The product store failed; passed through untouched.
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Scoring task failed: {0}")]
    Scoring(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, FeedError>;
