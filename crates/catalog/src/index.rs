//! Building the ProductCatalog from a snapshot.
//!
//! - Insert categories and products (rejecting duplicate ids)
//! - Build the category -> products index
//! - Compute per-category aggregates
//! - Validate references

use crate::error::{CatalogError, Result};
use crate::parser;
use crate::types::*;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

impl ProductCatalog {
    /// Load a catalog snapshot from disk and build every index.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading catalog snapshot from {:?}", path);
        let snapshot = parser::parse_snapshot(path)?;
        let catalog = Self::from_snapshot(snapshot)?;

        let (categories, products) = catalog.counts();
        info!("Catalog loaded: {} categories, {} products", categories, products);
        Ok(catalog)
    }

    /// Build a validated catalog from an in-memory snapshot.
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Result<Self> {
        let mut catalog = ProductCatalog::new();

        for category in snapshot.categories {
            if category.id.trim().is_empty() {
                return Err(CatalogError::InvalidValue {
                    field: "category.id".to_string(),
                    value: category.id,
                });
            }
            if catalog.categories.contains_key(&category.id) {
                return Err(CatalogError::DuplicateId {
                    entity: "Category".to_string(),
                    id: category.id,
                });
            }
            catalog.insert_category(category);
        }

        for product in snapshot.products {
            if product.id.trim().is_empty() {
                return Err(CatalogError::InvalidValue {
                    field: "product.id".to_string(),
                    value: product.id,
                });
            }
            if catalog.products.contains_key(&product.id) {
                return Err(CatalogError::DuplicateId {
                    entity: "Product".to_string(),
                    id: product.id,
                });
            }
            catalog.insert_product(product);
        }

        catalog.validate()?;
        catalog.build_secondary_indices();
        catalog.compute_category_stats();
        Ok(catalog)
    }

    /// Export the catalog back into snapshot form, products ordered by id.
    pub fn to_snapshot(&self) -> CatalogSnapshot {
        let mut products: Vec<Product> = self.products.values().cloned().collect();
        products.sort_by(|a, b| a.id.cmp(&b.id));
        CatalogSnapshot {
            categories: self.categories().into_iter().cloned().collect(),
            products,
        }
    }

    /// Rebuild the category -> products index.
    ///
    /// Each list is sorted by product id so lookups are deterministic.
    pub fn build_secondary_indices(&mut self) {
        self.category_index.clear();
        for (product_id, product) in &self.products {
            // A product listing the same category twice is indexed once
            let unique: HashSet<&CategoryId> = product.category_ids.iter().collect();
            for category in unique {
                self.category_index
                    .entry(category.clone())
                    .or_default()
                    .push(product_id.clone());
            }
        }
        for ids in self.category_index.values_mut() {
            ids.sort_unstable();
        }
    }

    /// Compute aggregate numbers for every category in parallel.
    ///
    /// Categories with no products still get an all-zero entry.
    pub fn compute_category_stats(&mut self) {
        let stats = self
            .categories
            .par_iter()
            .map(|(category_id, _)| {
                let mut stats = CategoryStats::default();
                for product_id in self.get_products_by_category(category_id) {
                    if let Some(product) = self.products.get(product_id) {
                        stats.product_count += 1;
                        stats.total_upvotes += product.upvotes;
                        stats.total_comments += product.comment_count;
                    }
                }
                (category_id.clone(), stats)
            })
            .collect();
        self.category_stats = stats;
    }

    /// Check that every product category exists.
    pub fn validate(&self) -> Result<()> {
        for product in self.products.values() {
            for category in &product.category_ids {
                if !self.categories.contains_key(category) {
                    return Err(CatalogError::MissingReference {
                        entity: "Category".to_string(),
                        id: category.clone(),
                        referenced_by: product.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn category(id: &str) -> Category {
        Category {
            id: id.to_string(),
            name: id.to_uppercase(),
        }
    }

    fn product(id: &str) -> Product {
        Product::new(id, id, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_from_snapshot_builds_category_index() {
        let snapshot = CatalogSnapshot {
            categories: vec![category("ai"), category("dev")],
            products: vec![
                product("b").with_category("ai").with_upvotes(5),
                product("a").with_category("ai").with_category("dev").with_upvotes(2),
                product("c"),
            ],
        };

        let catalog = ProductCatalog::from_snapshot(snapshot).unwrap();

        assert_eq!(catalog.counts(), (2, 3));
        assert_eq!(catalog.get_products_by_category("ai"), &["a".to_string(), "b".to_string()]);
        assert_eq!(catalog.get_products_by_category("dev"), &["a".to_string()]);
        assert!(catalog.get_products_by_category("unknown").is_empty());
    }

    #[test]
    fn test_category_stats() {
        let snapshot = CatalogSnapshot {
            categories: vec![category("ai"), category("empty")],
            products: vec![
                product("a").with_category("ai").with_upvotes(3).with_comments(1),
                product("b").with_category("ai").with_upvotes(4).with_comments(2),
            ],
        };

        let catalog = ProductCatalog::from_snapshot(snapshot).unwrap();

        let ai = catalog.get_category_stats("ai").unwrap();
        assert_eq!(ai.product_count, 2);
        assert_eq!(ai.total_upvotes, 7);
        assert_eq!(ai.total_comments, 3);

        let empty = catalog.get_category_stats("empty").unwrap();
        assert_eq!(empty.product_count, 0);
    }

    #[test]
    fn test_duplicate_category_listing_indexed_once() {
        let snapshot = CatalogSnapshot {
            categories: vec![category("ai")],
            products: vec![product("a").with_category("ai").with_category("ai")],
        };

        let catalog = ProductCatalog::from_snapshot(snapshot).unwrap();
        assert_eq!(catalog.get_products_by_category("ai").len(), 1);
        assert_eq!(catalog.get_category_stats("ai").unwrap().product_count, 1);
    }

    #[test]
    fn test_duplicate_product_id_rejected() {
        let snapshot = CatalogSnapshot {
            categories: vec![],
            products: vec![product("a"), product("a")],
        };

        let result = ProductCatalog::from_snapshot(snapshot);
        assert!(matches!(result, Err(CatalogError::DuplicateId { .. })));
    }

    #[test]
    fn test_unknown_category_rejected() {
        let snapshot = CatalogSnapshot {
            categories: vec![category("ai")],
            products: vec![product("a").with_category("games")],
        };

        match ProductCatalog::from_snapshot(snapshot) {
            Err(CatalogError::MissingReference { id, referenced_by, .. }) => {
                assert_eq!(id, "games");
                assert_eq!(referenced_by, "a");
            }
            other => panic!("expected MissingReference, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_product_id_rejected() {
        let snapshot = CatalogSnapshot {
            categories: vec![],
            products: vec![product("  ")],
        };

        let result = ProductCatalog::from_snapshot(snapshot);
        assert!(matches!(result, Err(CatalogError::InvalidValue { .. })));
    }

    #[test]
    fn test_to_snapshot_orders_products_by_id() {
        let snapshot = CatalogSnapshot {
            categories: vec![],
            products: vec![product("c"), product("a"), product("b")],
        };

        let catalog = ProductCatalog::from_snapshot(snapshot).unwrap();
        let ids: Vec<_> = catalog.to_snapshot().products.into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
