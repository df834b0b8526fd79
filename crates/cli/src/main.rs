use anyhow::{Context, Result, bail};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::info;

use catalog::{CatalogSnapshot, Category, Product, ProductCatalog, parser::write_snapshot};
use ranking::{DateRange, FilterDescriptor, RawFilterParams, SortMode};
use server::{FeedConfig, FeedOrchestrator, PopularityReport, RankedPage};
use store::InMemoryProductStore;

/// hobbyrider - product feed ranking engine
#[derive(Parser)]
#[command(name = "hobbyrider")]
#[command(about = "Rank, filter and paginate the hobbyrider product feed", long_about = None)]
struct Cli {
    /// Path to the catalog snapshot (JSON)
    #[arg(short, long, default_value = "data/catalog.json")]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of the ranked feed
    Feed {
        /// Category id to filter by
        #[arg(long)]
        category: Option<String>,

        /// top, new, discussed or trending
        #[arg(long)]
        sort: Option<String>,

        /// all, today, week or month
        #[arg(long)]
        date: Option<String>,

        /// Page number (1-based)
        #[arg(long)]
        page: Option<String>,

        /// Override the configured page size
        #[arg(long)]
        page_size: Option<usize>,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the most popular products by engagement score
    Popular {
        /// Category id to restrict the ranking to
        #[arg(long)]
        category: Option<String>,

        /// Number of products to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Print the canonical query string for a filter
    Link {
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        sort: Option<String>,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        page: Option<String>,
    },

    /// List categories with product counts
    Categories,

    /// Write a synthetic catalog snapshot
    Generate {
        /// Number of products to generate
        #[arg(long, default_value = "1000")]
        products: usize,

        /// Output path
        #[arg(long)]
        output: PathBuf,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

const GENERATED_CATEGORIES: [(&str, &str); 6] = [
    ("ai", "AI"),
    ("developer-tools", "Developer Tools"),
    ("productivity", "Productivity"),
    ("design", "Design"),
    ("games", "Games"),
    ("open-source", "Open Source"),
];

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Commands that don't need a catalog
    match cli.command {
        Commands::Link { category, sort, date, page } => {
            return handle_link(RawFilterParams { category, sort, date, page });
        }
        Commands::Generate { products, output } => return handle_generate(products, &output),
        _ => {}
    }

    let config = FeedConfig::from_env().context("Invalid feed configuration")?;

    let start = Instant::now();
    let store = InMemoryProductStore::load_from_file(&cli.catalog)
        .with_context(|| format!("Failed to load catalog from {}", cli.catalog.display()))?;
    let (category_count, product_count) = store.catalog().counts();
    println!(
        "{} Loaded {} products in {} categories in {:?}",
        "✓".green(),
        product_count,
        category_count,
        start.elapsed()
    );

    match cli.command {
        Commands::Feed { category, sort, date, page, page_size, json } => {
            let config = match page_size {
                Some(size) => config.with_page_size(
                    size.try_into().context("--page-size must be greater than zero")?,
                ),
                None => config,
            };
            let raw = RawFilterParams { category, sort, date, page };
            handle_feed(store, config, raw, json).await?
        }
        Commands::Popular { category, limit } => handle_popular(store, category, limit).await?,
        Commands::Categories => handle_categories(store.catalog()),
        Commands::Benchmark { requests, concurrent } => {
            handle_benchmark(store, config, requests, concurrent).await?
        }
        Commands::Link { .. } | Commands::Generate { .. } => {}
    }

    Ok(())
}

/// Handle the 'feed' command
async fn handle_feed(
    store: InMemoryProductStore,
    config: FeedConfig,
    raw: RawFilterParams,
    json: bool,
) -> Result<()> {
    let orchestrator = FeedOrchestrator::new(Arc::new(store), config);
    let descriptor = orchestrator.resolver().resolve(&raw);
    let page = orchestrator.get_ranked_page(&descriptor).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        print_page(&descriptor, &page);
    }
    Ok(())
}

/// Handle the 'popular' command
async fn handle_popular(
    store: InMemoryProductStore,
    category: Option<String>,
    limit: usize,
) -> Result<()> {
    if let Some(id) = category.as_deref() {
        if store.catalog().get_category(id).is_none() {
            bail!("Category {} not found", id);
        }
    }

    let report = PopularityReport::build(&store, category.as_deref(), limit, Utc::now()).await?;

    let scope = report.category.as_deref().unwrap_or("all categories");
    println!("{}", format!("Most popular in {}:", scope).bold().blue());
    for (i, entry) in report.entries.iter().enumerate() {
        println!(
            "{}. {} [{}] - Score: {:.1} (views {}, upvotes {}, comments {})",
            (i + 1).to_string().green(),
            entry.product.name,
            entry.product.id,
            entry.score,
            entry.product.views,
            entry.product.upvotes,
            entry.product.comment_count
        );
    }
    println!("{} products scored", report.candidates);
    Ok(())
}

/// Handle the 'link' command
fn handle_link(raw: RawFilterParams) -> Result<()> {
    let descriptor = ranking::resolve_filters(&raw);
    let query = descriptor.to_query().to_query_string();
    if query.is_empty() {
        println!("/");
    } else {
        println!("/?{}", query);
    }
    Ok(())
}

/// Handle the 'categories' command
fn handle_categories(catalog: &ProductCatalog) {
    println!("{}", "Categories:".bold().blue());
    for category in catalog.categories() {
        let stats = catalog.get_category_stats(&category.id).copied().unwrap_or_default();
        println!(
            "{}{} [{}]: {} products, {} upvotes, {} comments",
            "• ".green(),
            category.name,
            category.id,
            stats.product_count,
            stats.total_upvotes,
            stats.total_comments
        );
    }
}

/// Handle the 'generate' command
fn handle_generate(products: usize, output: &Path) -> Result<()> {
    let mut rng = rand::rng();
    let now = Utc::now();

    let categories: Vec<Category> = GENERATED_CATEGORIES
        .iter()
        .map(|(id, name)| Category { id: id.to_string(), name: name.to_string() })
        .collect();

    let products: Vec<Product> = (0..products)
        .map(|i| {
            // Skew towards recent launches and a long tail of low engagement
            let age_minutes = rng.random_range(0..60 * 24 * 60_i64);
            let age_minutes = age_minutes * age_minutes / (60 * 24 * 60);
            let upvotes = rng.random_range(0..40_u64).pow(2) / 4;
            let mut product = Product::new(
                format!("prod-{:06}", i),
                format!("Product {}", i),
                now - Duration::minutes(age_minutes),
            )
            .with_upvotes(upvotes)
            .with_views(upvotes * rng.random_range(5..60) + rng.random_range(0..200))
            .with_comments(rng.random_range(0..=upvotes / 3 + 1));

            let primary = rng.random_range(0..categories.len());
            product = product.with_category(categories[primary].id.clone());
            if rng.random_bool(0.25) {
                let secondary = rng.random_range(0..categories.len());
                if secondary != primary {
                    product = product.with_category(categories[secondary].id.clone());
                }
            }
            product
        })
        .collect();

    let snapshot = CatalogSnapshot { categories, products };
    // Validate before writing so the file always loads
    let catalog = ProductCatalog::from_snapshot(snapshot).context("Generated catalog is invalid")?;
    write_snapshot(output, &catalog.to_snapshot())
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let (category_count, product_count) = catalog.counts();
    println!(
        "{} Wrote {} products in {} categories to {}",
        "✓".green(),
        product_count,
        category_count,
        output.display()
    );
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    store: InMemoryProductStore,
    config: FeedConfig,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be greater than zero");
    }

    let category_ids: Vec<String> = store
        .catalog()
        .categories()
        .into_iter()
        .map(|c| c.id.clone())
        .collect();
    let orchestrator = FeedOrchestrator::new(Arc::new(store), config);
    let resolver = orchestrator.resolver();

    // Generate a set of random feed requests
    let descriptors: Vec<FilterDescriptor> = {
        let mut rng = rand::rng();
        (0..requests)
            .map(|_| {
                let sort = SortMode::ALL[rng.random_range(0..SortMode::ALL.len())];
                let date = DateRange::ALL[rng.random_range(0..DateRange::ALL.len())];
                let category = if !category_ids.is_empty() && rng.random_bool(0.3) {
                    Some(category_ids[rng.random_range(0..category_ids.len())].clone())
                } else {
                    None
                };
                resolver.resolve(&RawFilterParams {
                    category,
                    sort: Some(sort.to_string()),
                    date: Some(date.to_string()),
                    page: Some(rng.random_range(1..=5_u32).to_string()),
                })
            })
            .collect()
    };

    info!("Running {} requests, {} at a time", requests, concurrent.max(1));

    let semaphore = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();

    let mut handles = vec![];
    for descriptor in descriptors {
        let orchestrator = orchestrator.clone();
        let semaphore = semaphore.clone();
        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let start = Instant::now();
            orchestrator.get_ranked_page(&descriptor).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let total_time = wall_clock.elapsed();

    timings.sort();
    let latency_sum: std::time::Duration = timings.iter().sum();
    let avg_latency = latency_sum / (timings.len() as u32);
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Print a ranked page with its navigation links
fn print_page(descriptor: &FilterDescriptor, page: &RankedPage) {
    let scope = descriptor.category().unwrap_or("all categories");
    println!(
        "{}",
        format!(
            "{} / {} / {} - page {} of {} ({} products)",
            descriptor.sort_mode(),
            descriptor.date_range(),
            scope,
            page.page,
            page.total_pages,
            page.total_docs
        )
        .bold()
        .blue()
    );

    if page.docs.is_empty() {
        println!("  {}", "No products on this page".yellow());
    }

    for (i, product) in page.docs.iter().enumerate() {
        let rank = descriptor.offset() + i as u64 + 1;
        println!(
            "{}. {} [{}] ▲{} 💬{} - {}",
            rank.to_string().green(),
            product.name,
            product.id,
            product.upvotes,
            product.comment_count,
            product.created_at.format("%Y-%m-%d %H:%M")
        );
    }

    if let Some(prev) = page.prev_page {
        println!("{} /?{}", "prev:".cyan(), descriptor.page_link(prev));
    }
    if let Some(next) = page.next_page {
        println!("{} /?{}", "next:".cyan(), descriptor.page_link(next));
    }
}
