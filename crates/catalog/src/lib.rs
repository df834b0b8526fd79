//! # Catalog Crate
//!
//! Product domain types and the in-memory catalog the reference product
//! store serves from.
//!
//! ## Main Components
//!
//! - **types**: `Product`, `Category`, `ProductCatalog`
//! - **parser**: read/write JSON catalog snapshots
//! - **index**: build the category index and aggregates, validate references
//! - **error**: `CatalogError`
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::ProductCatalog;
//! use std::path::Path;
//!
//! let catalog = ProductCatalog::load_from_file(Path::new("data/catalog.json"))?;
//! for id in catalog.get_products_by_category("developer-tools") {
//!     println!("{}", catalog.get_product(id).unwrap().name);
//! }
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

pub use error::{CatalogError, Result};
pub use types::{
    CategoryId,
    ProductId,
    Category,
    CategoryStats,
    CatalogSnapshot,
    Product,
    ProductCatalog,
};
