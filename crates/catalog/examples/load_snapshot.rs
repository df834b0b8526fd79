//! Time how long a catalog snapshot takes to load and index.
//!
//! Run with: cargo run --package catalog --example load_snapshot -- data/catalog.json

use catalog::ProductCatalog;
use std::path::PathBuf;
use std::time::Instant;

fn main() -> Result<(), catalog::CatalogError> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/catalog.json"));

    println!("Loading catalog snapshot {}...\n", path.display());

    let start = Instant::now();
    let catalog = ProductCatalog::load_from_file(&path)?;
    let elapsed = start.elapsed();

    let (categories, products) = catalog.counts();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Categories: {}", categories);
    println!("Products: {}", products);
    for category in catalog.categories() {
        let count = catalog
            .get_category_stats(&category.id)
            .map(|s| s.product_count)
            .unwrap_or(0);
        println!("  {:<24} {}", category.name, count);
    }
    println!("\nPerformance: {:.0} products/second",
             products as f64 / elapsed.as_secs_f64());
    Ok(())
}
