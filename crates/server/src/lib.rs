//! Server crate for the hobbyrider feed engine.
//!
//! This crate contains the orchestrator that turns a resolved filter into
//! a ranked, paginated feed page, plus the popularity analytics built on
//! the same scores.

pub mod analytics;
pub mod config;
pub mod error;
pub mod orchestrator;

pub use analytics::{PopularProduct, PopularityReport};
pub use config::{ConfigError, FeedConfig};
pub use error::{FeedError, Result};
pub use orchestrator::{FeedOrchestrator, RankedPage};
