//! # kbcrawl - Knowledge-Base Crawler for Semantic Search
//!
//! This crate harvests help articles from a multi-section knowledge-base site
//! and turns them into a deduplicated, categorized corpus with one embedding
//! vector per article, ready to be loaded into a vector store.
//!
//! ## Features
//!
//! - URL normalization used as the single deduplication key
//! - Category traversal with pagination discovery
//! - Heuristic article text and content-image extraction
//! - Main-group classification of categories (backoffice, POS, webshop)
//! - Incremental, atomic JSON snapshots keyed by category
//! - Rate-limited embedding generation through `rig`
//! - Async API with Tokio and structured logging with `tracing`
//!
//! ## Example
//!
//! ```rust,no_run
//! use kbcrawl::crawler::{
//!     seeds, Classifier, Crawler, CrawlerConfig, HttpFetcher, Storage, StorageConfig,
//! };
//! use kbcrawl::model::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CrawlerConfig::default();
//!     let fetcher = HttpFetcher::new(&config)?;
//!     let client = Client::new_openai_from_env()?;
//!     let storage = Storage::with_config(StorageConfig::default());
//!
//!     let mut crawler = Crawler::new(
//!         config,
//!         fetcher,
//!         client.embedding().clone(),
//!         Classifier::default(),
//!         storage,
//!     )?;
//!     let summary = crawler.run(&seeds::all_seed_urls()).await?;
//!
//!     println!("Stored {} articles", summary.articles_stored);
//!     Ok(())
//! }
//! ```

mod error;
pub mod model;

pub mod crawler;

pub use error::Error;

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
