//! # Store Crate
//!
//! The Product Store interface the feed engine consumes, plus an
//! in-memory implementation over a `ProductCatalog`.
//!
//! ## Components
//!
//! ### ProductStore
//! Async trait with three queries:
//! - `count_matching`: size of the filtered set
//! - `query_page`: column-ordered page with offset/limit pushed down
//! - `query_all_matching`: the full filtered set, for derived-score sorts
//!
//! ### InMemoryProductStore
//! Reference implementation. Filtering goes through a
//! `CandidateFilterPipeline` built from the `StoreFilter`.
//!
//! ## Example Usage
//!
//! ```ignore
//! use store::{InMemoryProductStore, OrderBy, ProductStore, SortColumn, StoreFilter};
//!
//! let store = InMemoryProductStore::load_from_file(Path::new("data/catalog.json"))?;
//! let filter = StoreFilter::new().with_category("ai");
//! let total = store.count_matching(&filter).await?;
//! let page = store
//!     .query_page(&filter, OrderBy::desc(SortColumn::Upvotes), OrderBy::desc(SortColumn::CreatedAt), 0, 12)
//!     .await?;
//! ```

pub mod error;
pub mod types;
pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod memory;

// Re-export commonly used types
pub use error::{Result, StoreError};
pub use types::{OrderBy, SortColumn, SortDirection, StoreFilter};
pub use traits::{CandidateFilter, ProductStore};
pub use filter_pipeline::CandidateFilterPipeline;
pub use memory::InMemoryProductStore;
