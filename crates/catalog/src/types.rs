//! Core domain types for the product catalog.
//!
//! These are read projections of the products owned by the site's
//! database. The feed engine never mutates them; a fresh set is supplied
//! for every request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a product (slug or cuid in the web app)
pub type ProductId = String;

/// Unique identifier for a category (slug)
pub type CategoryId = String;

// =============================================================================
// Product
// =============================================================================

/// A submitted product, as seen by the ranking engine.
///
/// Field names serialize in camelCase so snapshots exported from the web
/// app's ORM load without a mapping layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
}

impl Product {
    /// Create a product with zeroed engagement counters.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            created_at,
            upvotes: 0,
            views: 0,
            comment_count: 0,
            category_ids: Vec::new(),
        }
    }

    pub fn with_upvotes(mut self, upvotes: u64) -> Self {
        self.upvotes = upvotes;
        self
    }

    pub fn with_views(mut self, views: u64) -> Self {
        self.views = views;
        self
    }

    pub fn with_comments(mut self, comment_count: u64) -> Self {
        self.comment_count = comment_count;
        self
    }

    pub fn with_category(mut self, category: impl Into<CategoryId>) -> Self {
        self.category_ids.push(category.into());
        self
    }

    /// Whether this product is listed under `category`.
    pub fn in_category(&self, category: &str) -> bool {
        self.category_ids.iter().any(|c| c == category)
    }
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Aggregate numbers for one category, computed after loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub product_count: u64,
    pub total_upvotes: u64,
    pub total_comments: u64,
}

/// On-disk layout of a catalog snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub products: Vec<Product>,
}

// =============================================================================
// ProductCatalog - in-memory index
// =============================================================================

/// Holds every product and category plus the lookup indices.
///
/// Getters hand out references; the catalog is shared behind an `Arc`
/// once built and is never mutated after that.
#[derive(Debug, Default)]
pub struct ProductCatalog {
    pub(crate) products: HashMap<ProductId, Product>,
    pub(crate) categories: HashMap<CategoryId, Category>,

    /// Products grouped by category (a product can appear in several lists)
    pub(crate) category_index: HashMap<CategoryId, Vec<ProductId>>,

    pub(crate) category_stats: HashMap<CategoryId, CategoryStats>,
}

impl ProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    pub fn get_category(&self, id: &str) -> Option<&Category> {
        self.categories.get(id)
    }

    /// All products, in no particular order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// All categories sorted by name.
    pub fn categories(&self) -> Vec<&Category> {
        let mut categories: Vec<&Category> = self.categories.values().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        categories
    }

    /// Product ids listed under a category. Empty if the category is unknown.
    pub fn get_products_by_category(&self, category: &str) -> &[ProductId] {
        self.category_index
            .get(category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_category_stats(&self, category: &str) -> Option<&CategoryStats> {
        self.category_stats.get(category)
    }

    pub fn insert_product(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    pub fn insert_category(&mut self, category: Category) {
        self.categories.insert(category.id.clone(), category);
    }

    /// (categories, products)
    pub fn counts(&self) -> (usize, usize) {
        (self.categories.len(), self.products.len())
    }
}
