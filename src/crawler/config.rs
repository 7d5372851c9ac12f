//! # Crawler Configuration Module
//!
//! Configuration for a crawl run: which site is crawled, how requests present
//! themselves to it, how long the crawler pauses between requests and how
//! often in-memory progress is checkpointed to disk. Built with a builder for
//! flexible configuration.
//!
//! The defaults reproduce the politeness contract with the source site:
//! half a second after every page or article fetch and a full second between
//! seed categories.

use std::time::Duration;

/// Root of the knowledge base crawled by default
pub const DEFAULT_SITE_ROOT: &str = "https://knowledge.cowis.net/";

/// Browser identity presented to the source site
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// The site is German-language; asking for `de` avoids localized redirects
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7";

/// Configuration for the crawler
#[derive(Debug, Clone)]
pub struct CrawlerConfig {
    /// Site root every crawled URL must live under
    pub site_root: String,

    /// User agent to use for requests
    pub user_agent: String,

    /// Value of the `Accept-Language` request header
    pub accept_language: String,

    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Pause after every article fetch, in milliseconds
    pub article_delay_ms: u64,

    /// Pause after every category page fetch, in milliseconds
    pub page_delay_ms: u64,

    /// Pause between seed categories, in milliseconds
    pub seed_delay_ms: u64,

    /// Number of stored articles between two automatic snapshots
    pub checkpoint_interval: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            site_root: DEFAULT_SITE_ROOT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            request_timeout_ms: 10_000,
            article_delay_ms: 500,
            page_delay_ms: 500,
            seed_delay_ms: 1_000,
            checkpoint_interval: 5,
        }
    }
}

/// Builder for CrawlerConfig
#[derive(Debug, Default)]
pub struct CrawlerConfigBuilder {
    config: CrawlerConfig,
}

impl CrawlerConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CrawlerConfig::default(),
        }
    }

    /// Set the site root
    pub fn site_root(mut self, site_root: impl Into<String>) -> Self {
        self.config.site_root = site_root.into();
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the `Accept-Language` header value
    pub fn accept_language(mut self, accept_language: impl Into<String>) -> Self {
        self.config.accept_language = accept_language.into();
        self
    }

    /// Set the request timeout in milliseconds
    pub fn request_timeout_ms(mut self, request_timeout_ms: u64) -> Self {
        self.config.request_timeout_ms = request_timeout_ms;
        self
    }

    /// Set the pause after article and category page fetches
    pub fn request_delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.article_delay_ms = delay_ms;
        self.config.page_delay_ms = delay_ms;
        self
    }

    /// Set the pause between seed categories
    pub fn seed_delay_ms(mut self, seed_delay_ms: u64) -> Self {
        self.config.seed_delay_ms = seed_delay_ms;
        self
    }

    /// Set how many stored articles trigger an automatic snapshot
    pub fn checkpoint_interval(mut self, checkpoint_interval: usize) -> Self {
        self.config.checkpoint_interval = checkpoint_interval;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CrawlerConfig {
        self.config
    }
}

impl CrawlerConfig {
    /// Create a new builder
    pub fn builder() -> CrawlerConfigBuilder {
        CrawlerConfigBuilder::new()
    }

    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Get the article pause as a Duration
    pub fn article_delay(&self) -> Duration {
        Duration::from_millis(self.article_delay_ms)
    }

    /// Get the category page pause as a Duration
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// Get the inter-seed pause as a Duration
    pub fn seed_delay(&self) -> Duration {
        Duration::from_millis(self.seed_delay_ms)
    }
}
