//! # Knowledge-Base Crawler Module
//!
//! This module walks the category pages of a knowledge-base site, follows
//! their pagination, extracts every linked article and files the results by
//! category and main group.
//!
//! ## Key Components
//!
//! - `CrawlerConfig`: Site root, request headers, politeness delays, checkpoint cadence
//! - `normalize_url`: Canonical URL form used for deduplication
//! - `HttpFetcher`: GET-only fetcher with locale headers and a fixed timeout
//! - `extract_text` / `extract_images`: Ordered extraction strategies over parsed HTML
//! - `Classifier`: Maps categories onto a `MainGroup`
//! - `Crawler`: The traversal engine, owner of all per-run state
//! - `Storage`: Atomic JSON snapshots of the category map and the flat corpus
//!
//! ## Usage
//!
//! A run is a single `Crawler` instance driven over the seed category list.
//! Nothing is shared between runs: every run starts with an empty visited set.

mod classify;
mod config;
mod content_extraction;
mod error;
mod fetcher;
mod normalize;
pub mod repair;
pub mod seeds;
pub mod storage;
mod traversal;

// Re-export important types and functions
pub use classify::{Classifier, MainGroup};
pub use config::{CrawlerConfig, CrawlerConfigBuilder, DEFAULT_SITE_ROOT};
pub use content_extraction::{extract_images, extract_text, MIN_CONTENT_CHARS};
pub use error::{CrawlError, FetchError};
pub use fetcher::{Fetch, HttpFetcher};
pub use normalize::{category_name, is_article_url, is_category_url, normalize_url};
pub use storage::{Storage, StorageConfig, StorageError};
pub use traversal::{ArticleOutcome, CrawlEvent, CrawlSummary, Crawler};

use serde::{Deserialize, Serialize};

/// A single knowledge-base article reduced to text, images and its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// URL the article was fetched from
    pub url: String,

    /// Extracted plain text
    pub text: String,

    /// Embedding vector of `text`
    pub embedding: Vec<f32>,

    /// Absolute URLs of the content images
    pub images: Vec<String>,
}

/// A knowledge-base section and the articles collected under it
#[derive(Debug, Clone)]
pub struct Category {
    /// Name derived from the category URL
    pub name: String,

    /// Main group, fixed when the category is first seen
    pub main_group: MainGroup,

    /// Articles in discovery order
    pub articles: Vec<Article>,
}

impl Category {
    /// Create an empty category
    pub fn new(name: impl Into<String>, main_group: MainGroup) -> Self {
        Self {
            name: name.into(),
            main_group,
            articles: Vec::new(),
        }
    }

    /// Number of articles collected so far
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    /// Whether no article has been collected yet
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
