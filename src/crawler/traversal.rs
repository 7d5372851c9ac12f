//! Category → article traversal
//!
//! A `Crawler` is built once per run and owns everything the run mutates:
//! the visited set, the category map and the flat corpus. Requests are issued
//! one at a time.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::time::Duration;

use rig::embeddings::EmbeddingModel;
use scraper::{ElementRef, Html};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use super::classify::{Classifier, MainGroup};
use super::config::CrawlerConfig;
use super::content_extraction::{extract_images, extract_text};
use super::error::CrawlError;
use super::fetcher::Fetch;
use super::normalize::{category_name, is_article_url, is_category_url, normalize_url};
use super::storage::Storage;
use super::{Article, Category};
use crate::model::article_vector;

/// Anchor glyphs used by the site for "next page" links
const NEXT_PAGE_GLYPHS: &[char] = &['→', '⇥'];

/// What happened to a single article URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleOutcome {
    /// Extracted, embedded and added to its category
    Stored,
    /// Already processed earlier in this run
    AlreadyVisited,
    /// The page could not be fetched
    FetchFailed,
    /// No content region passed the length threshold
    EmptyText,
    /// The embedding provider failed; the article is dropped
    EmbeddingFailed,
}

/// Progress notifications for observers of a run
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    /// A category started being crawled
    CategoryStarted { name: String, group: MainGroup },
    /// An article was stored; `total` counts the whole run
    ArticleStored { url: String, total: usize },
    /// An article was skipped
    ArticleSkipped { url: String, outcome: ArticleOutcome },
    /// A snapshot was written
    Snapshot { articles: usize },
}

/// Counters of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Categories entered (seeds not skipped as already visited)
    pub categories_visited: usize,
    /// Category page fetch attempts, pagination included
    pub pages_fetched: usize,
    /// Articles stored
    pub articles_stored: usize,
    /// Article URLs that were fetched or attempted but not stored
    pub articles_skipped: usize,
    /// Snapshots written, checkpoints and the final one
    pub snapshots: usize,
}

/// The traversal engine
pub struct Crawler<F, E>
where
    F: Fetch,
    E: EmbeddingModel,
{
    config: CrawlerConfig,
    site_root: Url,
    root_key: String,
    fetcher: F,
    embedder: E,
    classifier: Classifier,
    storage: Storage,
    visited: HashSet<String>,
    categories: BTreeMap<String, Category>,
    corpus: Vec<Article>,
    summary: CrawlSummary,
    events: Option<mpsc::Sender<CrawlEvent>>,
}

impl<F, E> Crawler<F, E>
where
    F: Fetch,
    E: EmbeddingModel,
{
    /// Create a crawler with empty run state
    pub fn new(
        config: CrawlerConfig,
        fetcher: F,
        embedder: E,
        classifier: Classifier,
        storage: Storage,
    ) -> Result<Self, CrawlError> {
        let site_root = Url::parse(&config.site_root)?;
        let root_key = normalize_url(site_root.as_str());
        Ok(Self {
            config,
            site_root,
            root_key,
            fetcher,
            embedder,
            classifier,
            storage,
            visited: HashSet::new(),
            categories: BTreeMap::new(),
            corpus: Vec::new(),
            summary: CrawlSummary::default(),
            events: None,
        })
    }

    /// Send progress events to `sender`
    pub fn with_events(mut self, sender: mpsc::Sender<CrawlEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// Normalized URLs processed so far
    pub fn visited(&self) -> &HashSet<String> {
        &self.visited
    }

    /// Whether `url` was processed in this run
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(&normalize_url(url))
    }

    /// Categories seen so far, by name
    pub fn categories(&self) -> &BTreeMap<String, Category> {
        &self.categories
    }

    /// Every stored article in storage order
    pub fn corpus(&self) -> &[Article] {
        &self.corpus
    }

    /// Counters so far
    pub fn summary(&self) -> &CrawlSummary {
        &self.summary
    }

    /// Crawl every seed category, then write the final snapshot
    ///
    /// Individual pages never fail the run; only the final snapshot can.
    #[instrument(skip_all, fields(seeds = seeds.len()))]
    pub async fn run(&mut self, seeds: &[String]) -> Result<CrawlSummary, CrawlError> {
        info!("Starting crawl of {} categories", seeds.len());

        for seed in seeds {
            self.crawl_category(seed).await;
            pause(self.config.seed_delay()).await;
        }

        self.snapshot().await?;
        info!(
            "Crawl finished: {} articles in {} categories",
            self.corpus.len(),
            self.categories.len()
        );
        Ok(self.summary.clone())
    }

    /// Crawl one category and all of its pagination pages
    #[instrument(skip(self))]
    pub async fn crawl_category(&mut self, url: &str) {
        let key = normalize_url(url);
        if self.visited.contains(&key) {
            debug!("Category already visited: {}", url);
            return;
        }

        let name = category_name(url);
        let group = self.ensure_category(&name, url);
        info!("Crawling category {} ({})", name, group);
        self.summary.categories_visited += 1;
        self.emit(CrawlEvent::CategoryStarted {
            name: name.clone(),
            group,
        })
        .await;

        let mut queue = VecDeque::from([url.to_string()]);
        let mut queued = HashSet::from([key]);

        while let Some(page_url) = queue.pop_front() {
            if !self.visited.insert(normalize_url(&page_url)) {
                continue;
            }

            debug!("Reading page {}", page_url);
            let fetched = self.fetcher.fetch(&page_url).await;
            self.summary.pages_fetched += 1;
            pause(self.config.page_delay()).await;

            let Ok(html) = fetched else {
                continue;
            };

            let (articles, pages) = self.discover_links(&html, &queued);
            info!("Found {} articles on {}", articles.len(), page_url);

            for article_url in articles {
                self.process_article(&article_url, &name).await;
            }

            for page in pages {
                queued.insert(normalize_url(&page));
                queue.push_back(page);
            }
        }
    }

    /// Fetch, extract, embed and store one article
    #[instrument(skip(self))]
    pub async fn process_article(&mut self, url: &str, category: &str) -> ArticleOutcome {
        if !self.visited.insert(normalize_url(url)) {
            return ArticleOutcome::AlreadyVisited;
        }

        info!("Scraping article {}", url);
        let outcome = match self.fetcher.fetch(url).await {
            Ok(html) => self.store_article(url, &html, category).await,
            Err(_) => ArticleOutcome::FetchFailed,
        };
        pause(self.config.article_delay()).await;

        if outcome != ArticleOutcome::Stored {
            self.summary.articles_skipped += 1;
            self.emit(CrawlEvent::ArticleSkipped {
                url: url.to_string(),
                outcome,
            })
            .await;
        }
        outcome
    }

    async fn store_article(&mut self, url: &str, html: &str, category: &str) -> ArticleOutcome {
        let text = extract_text(html);
        if text.is_empty() {
            warn!("Could not extract text from {}", url);
            return ArticleOutcome::EmptyText;
        }
        debug!("Extracted {} characters from {}", text.chars().count(), url);

        let images = extract_images(html, url, &self.site_root);
        if !images.is_empty() {
            debug!("Found {} images in {}", images.len(), url);
        }

        let embedding = match self.embedder.embed_text(&text).await {
            Ok(embedding) => article_vector(&embedding),
            Err(e) => {
                warn!("Embedding failed for {}: {}", url, e);
                return ArticleOutcome::EmbeddingFailed;
            }
        };
        let Some(embedding) = embedding else {
            warn!("Embedding for {} is unusable", url);
            return ArticleOutcome::EmbeddingFailed;
        };

        let article = Article {
            url: url.to_string(),
            text,
            embedding,
            images,
        };

        self.ensure_category(category, url);
        if let Some(entry) = self.categories.get_mut(category) {
            entry.articles.push(article.clone());
        }
        self.corpus.push(article);
        self.summary.articles_stored += 1;
        info!("Stored article {}", url);
        self.emit(CrawlEvent::ArticleStored {
            url: url.to_string(),
            total: self.corpus.len(),
        })
        .await;

        let interval = self.config.checkpoint_interval;
        if interval > 0 && self.corpus.len() % interval == 0 {
            if let Err(e) = self.snapshot().await {
                error!("Checkpoint failed: {}", e);
            }
        }

        ArticleOutcome::Stored
    }

    /// Write the current state through the storage
    async fn snapshot(&mut self) -> Result<(), CrawlError> {
        let report = self.storage.snapshot(&self.categories, &self.corpus).await?;
        self.summary.snapshots += 1;
        info!(
            "Snapshot: {} articles in {} categories",
            report.articles, report.categories
        );
        self.emit(CrawlEvent::Snapshot {
            articles: report.articles,
        })
        .await;
        Ok(())
    }

    /// Main group of `name`, classifying it from `url` the first time only
    fn ensure_category(&mut self, name: &str, url: &str) -> MainGroup {
        let classifier = &self.classifier;
        self.categories
            .entry(name.to_string())
            .or_insert_with(|| Category::new(name, classifier.classify(url)))
            .main_group
    }

    /// Article links and new pagination links of a category page
    fn discover_links(
        &self,
        html: &str,
        queued: &HashSet<String>,
    ) -> (Vec<String>, Vec<String>) {
        let document = Html::parse_document(html);
        let mut articles = Vec::new();
        let mut seen_articles = HashSet::new();
        let mut pages = Vec::new();
        let mut seen_pages = HashSet::new();

        for anchor in document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| el.value().name() == "a")
        {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let Ok(mut absolute) = self.site_root.join(href) else {
                continue;
            };
            absolute.set_fragment(None);
            let absolute = String::from(absolute);

            let key = normalize_url(&absolute);
            if !self.within_site(&key) {
                continue;
            }

            if is_article_url(&key) {
                if seen_articles.insert(key) {
                    articles.push(absolute);
                }
                continue;
            }

            if is_category_url(&key)
                && !self.visited.contains(&key)
                && !queued.contains(&key)
                && !seen_pages.contains(&key)
            {
                let label: String = anchor.text().collect();
                if is_pagination_label(&label) {
                    seen_pages.insert(key);
                    pages.push(absolute);
                }
            }
        }

        (articles, pages)
    }

    fn within_site(&self, key: &str) -> bool {
        key == self.root_key
            || key
                .strip_prefix(self.root_key.as_str())
                .is_some_and(|rest| rest.starts_with('/'))
    }

    async fn emit(&self, event: CrawlEvent) {
        if let Some(sender) = &self.events {
            let _ = sender.send(event).await;
        }
    }
}

fn is_pagination_label(label: &str) -> bool {
    label
        .chars()
        .any(|c| c.is_ascii_digit() || NEXT_PAGE_GLYPHS.contains(&c))
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::error::FetchError;
    use crate::crawler::storage::StorageConfig;
    use crate::model::MockEmbeddingModel;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    const ROOT: &str = "https://kb.example/";

    /// In-memory link graph keyed by normalized URL
    #[derive(Clone, Default)]
    struct StaticSite {
        pages: HashMap<String, Result<String, u16>>,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl StaticSite {
        fn page(mut self, url: &str, html: impl Into<String>) -> Self {
            self.pages.insert(normalize_url(url), Ok(html.into()));
            self
        }

        fn status(mut self, url: &str, status: u16) -> Self {
            self.pages.insert(normalize_url(url), Err(status));
            self
        }

        fn fetched(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    impl Fetch for StaticSite {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.log.lock().unwrap().push(normalize_url(url));
            match self.pages.get(&normalize_url(url)) {
                Some(Ok(html)) => Ok(html.clone()),
                Some(Err(status)) => Err(FetchError::Status(*status)),
                None => Err(FetchError::Status(404)),
            }
        }
    }

    fn config() -> CrawlerConfig {
        CrawlerConfig::builder()
            .site_root(ROOT)
            .request_delay_ms(0)
            .seed_delay_ms(0)
            .build()
    }

    fn crawler(
        site: StaticSite,
        embedder: MockEmbeddingModel,
        dir: &TempDir,
    ) -> Crawler<StaticSite, MockEmbeddingModel> {
        let storage = Storage::with_config(StorageConfig {
            base_path: dir.path().to_path_buf(),
            ..StorageConfig::default()
        });
        Crawler::new(config(), site, embedder, Classifier::default(), storage).unwrap()
    }

    fn category_page(links: &[(&str, &str)]) -> String {
        let anchors: String = links
            .iter()
            .map(|(href, label)| format!(r#"<a href="{}">{}</a>"#, href, label))
            .collect();
        format!("<html><body><div class=\"list\">{}</div></body></html>", anchors)
    }

    fn article_page(body: &str, extra: &str) -> String {
        format!(
            r#"<html><body><nav><a href="/">Home</a></nav>
            <div class="content"><h2>Artikel</h2><p>{}</p>{}</div></body></html>"#,
            body, extra
        )
    }

    fn words(chars: usize) -> String {
        "Knowledge base article text. ".repeat(chars / 29 + 1)[..chars].to_string()
    }

    #[tokio::test]
    async fn test_end_to_end_single_category() {
        let seed = "https://kb.example/category/21/intro.html";
        let good = "https://kb.example/content/21/1/de/good.html";
        let missing = "https://kb.example/content/21/2/de/missing.html";

        let text = words(250);
        assert_eq!(text.chars().count(), 250);
        let site = StaticSite::default()
            .page(
                seed,
                category_page(&[
                    ("/content/21/1/de/good.html", "Good"),
                    ("/content/21/2/de/missing.html", "Missing"),
                ]),
            )
            .page(
                good,
                article_page(&text, r#"<img src="/images/screen.png" width="200">"#),
            )
            .status(missing, 404);

        let dir = TempDir::new().unwrap();
        let mut crawler = crawler(site.clone(), MockEmbeddingModel::default(), &dir);
        let summary = crawler.run(&[seed.to_string()]).await.unwrap();

        assert_eq!(summary.articles_stored, 1);
        assert_eq!(summary.articles_skipped, 1);
        assert_eq!(summary.snapshots, 1);

        let category = &crawler.categories()["intro"];
        assert_eq!(category.main_group, MainGroup::Backoffice);
        assert_eq!(category.articles.len(), 1);
        assert_eq!(category.articles[0].url, good);
        assert_eq!(
            category.articles[0].images,
            vec!["https://kb.example/images/screen.png".to_string()]
        );

        let storage = Storage::with_config(StorageConfig {
            base_path: dir.path().to_path_buf(),
            ..StorageConfig::default()
        });
        let index = storage.load_index(MainGroup::Backoffice).await.unwrap();
        assert_eq!(index.total_articles, 1);
        assert_eq!(index.categories.get("intro"), Some(&1));

        assert!(crawler.is_visited(missing));
        let persisted = storage.load_category(MainGroup::Backoffice, "intro").await.unwrap();
        let corpus = storage.load_corpus().await.unwrap();
        assert!(persisted.iter().chain(corpus.iter()).all(|a| a.url != missing));
        assert_eq!(corpus.len(), 1);
    }

    #[tokio::test]
    async fn test_each_url_fetched_once_per_run() {
        let shared = "https://kb.example/content/1/shared.html";
        let own = "https://kb.example/content/2/own.html";
        let site = StaticSite::default()
            .page(
                "https://kb.example/category/21/a.html",
                category_page(&[
                    ("/content/1/shared.html", "Shared"),
                    ("/content/1/shared.html?ref=list", "Shared again"),
                    ("/CONTENT/1/Shared.html", "Shared upper"),
                    ("/category/21/a.html?sort=asc", "1"),
                ]),
            )
            .page(
                "https://kb.example/category/24/b.html",
                category_page(&[
                    ("/content/1/shared.html", "Shared"),
                    ("/content/2/own.html", "Own"),
                ]),
            )
            .page(shared, article_page(&words(150), ""))
            .page(own, article_page(&words(150), ""));

        let seeds = vec![
            "https://kb.example/category/21/a.html".to_string(),
            "https://kb.example/category/24/b.html".to_string(),
            "https://kb.example/category/21/a.html".to_string(),
        ];

        let mut runs = Vec::new();
        for _ in 0..2 {
            let site = StaticSite {
                log: Arc::new(Mutex::new(Vec::new())),
                ..site.clone()
            };
            let dir = TempDir::new().unwrap();
            let mut crawler = crawler(site.clone(), MockEmbeddingModel::default(), &dir);
            let summary = crawler.run(&seeds).await.unwrap();
            assert_eq!(summary.articles_stored, 2);

            let fetched = site.fetched();
            let unique: HashSet<_> = fetched.iter().cloned().collect();
            assert_eq!(unique.len(), fetched.len(), "duplicate fetch in {:?}", fetched);
            assert_eq!(fetched.len(), 4);
            runs.push(unique);
        }
        assert_eq!(runs[0], runs[1]);
    }

    #[tokio::test]
    async fn test_pagination_loop_terminates_after_one_fetch() {
        let seed = "https://kb.example/category/21/intro.html";
        let site = StaticSite::default().page(
            seed,
            category_page(&[
                ("/category/21/intro.html?page=2", "2"),
                ("/category/21/intro.html/?page=3", "3 →"),
            ]),
        );

        let dir = TempDir::new().unwrap();
        let mut crawler = crawler(site.clone(), MockEmbeddingModel::default(), &dir);
        crawler.crawl_category(seed).await;

        assert_eq!(site.fetched(), vec![normalize_url(seed)]);
        assert_eq!(crawler.summary().pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_pagination_follows_numbered_category_links() {
        let seed = "https://kb.example/category/21/intro.html";
        let page2 = "https://kb.example/category/21/2/intro.html";
        let site = StaticSite::default()
            .page(
                seed,
                category_page(&[
                    ("/content/21/a.html", "A"),
                    ("/category/21/2/intro.html", "2"),
                    ("/category/21/3/intro.html", "Weiter"),
                ]),
            )
            .page(
                page2,
                category_page(&[
                    ("/content/21/b.html", "B"),
                    ("/category/21/intro.html", "1"),
                    ("/category/21/2/intro.html", "2"),
                ]),
            )
            .page("https://kb.example/content/21/a.html", article_page(&words(120), ""))
            .page("https://kb.example/content/21/b.html", article_page(&words(130), ""));

        let dir = TempDir::new().unwrap();
        let mut crawler = crawler(site.clone(), MockEmbeddingModel::default(), &dir);
        crawler.crawl_category(seed).await;

        assert_eq!(crawler.summary().pages_fetched, 2);
        assert_eq!(crawler.categories()["intro"].articles.len(), 2);
        assert!(!crawler.is_visited("https://kb.example/category/21/3/intro.html"));
    }

    #[tokio::test]
    async fn test_pagination_accepts_any_category_path() {
        let seed = "https://kb.example/category/21/intro.html";
        let site = StaticSite::default().page(
            seed,
            category_page(&[
                ("/category/intro.html?p=2", "Seite 2"),
                ("/category/21-2/intro.html", "2"),
                ("/category/23/einfuehrung.html", "1. Einführung"),
                ("/category/24/handbuch.html", "Handbuch"),
            ]),
        );

        let dir = TempDir::new().unwrap();
        let mut crawler = crawler(site.clone(), MockEmbeddingModel::default(), &dir);
        crawler.crawl_category(seed).await;

        assert_eq!(
            site.fetched(),
            vec![
                normalize_url(seed),
                "https://kb.example/category/intro.html".to_string(),
                "https://kb.example/category/21-2/intro.html".to_string(),
                "https://kb.example/category/23/einfuehrung.html".to_string(),
            ]
        );
        assert!(!crawler.is_visited("https://kb.example/category/24/handbuch.html"));
    }

    #[tokio::test]
    async fn test_checkpoint_cadence() {
        let seed = "https://kb.example/category/21/intro.html";
        let mut links = Vec::new();
        let mut site = StaticSite::default();
        for i in 0..5 {
            links.push(format!("/content/21/{}.html", i));
            site = site.page(
                &format!("https://kb.example/content/21/{}.html", i),
                article_page(&format!("{} {}", i, words(150)), ""),
            );
        }
        let four: Vec<(&str, &str)> = links[..4].iter().map(|l| (l.as_str(), "x")).collect();
        let five: Vec<(&str, &str)> = links.iter().map(|l| (l.as_str(), "x")).collect();

        let dir = TempDir::new().unwrap();
        let mut crawler4 = crawler(
            site.clone().page(seed, category_page(&four)),
            MockEmbeddingModel::default(),
            &dir,
        );
        crawler4.crawl_category(seed).await;
        assert_eq!(crawler4.corpus().len(), 4);
        assert_eq!(crawler4.summary().snapshots, 0);
        assert!(!dir.path().join("articles_with_embeddings.json").exists());

        let dir = TempDir::new().unwrap();
        let mut crawler5 = crawler(
            site.page(seed, category_page(&five)),
            MockEmbeddingModel::default(),
            &dir,
        );
        crawler5.crawl_category(seed).await;
        assert_eq!(crawler5.summary().snapshots, 1);
        let corpus = std::fs::read_to_string(dir.path().join("articles_with_embeddings.json")).unwrap();
        let corpus: Vec<Article> = serde_json::from_str(&corpus).unwrap();
        assert_eq!(corpus.len(), 5);
    }

    #[tokio::test]
    async fn test_short_article_is_dropped_without_embedding() {
        let seed = "https://kb.example/category/21/intro.html";
        let short = "https://kb.example/content/21/short.html";
        let site = StaticSite::default()
            .page(seed, category_page(&[("/content/21/short.html", "Short")]))
            .page(short, article_page("Too short to be an article.", ""));

        let embedder = MockEmbeddingModel::default();
        let dir = TempDir::new().unwrap();
        let mut crawler = crawler(site, embedder.clone(), &dir);
        crawler.run(&[seed.to_string()]).await.unwrap();

        assert_eq!(embedder.calls(), 0);
        assert!(crawler.corpus().is_empty());
        assert!(crawler.is_visited(short));
        let corpus: Vec<Article> = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join("articles_with_embeddings.json")).unwrap(),
        )
        .unwrap();
        assert!(corpus.is_empty());
        assert!(!dir.path().join("backoffice").exists());
    }

    #[tokio::test]
    async fn test_embedding_failure_drops_article() {
        let seed = "https://kb.example/category/21/intro.html";
        let site = StaticSite::default()
            .page(
                seed,
                category_page(&[("/content/21/a.html", "A"), ("/content/21/b.html", "B")]),
            )
            .page(
                "https://kb.example/content/21/a.html",
                article_page(&format!("POISON {}", words(150)), ""),
            )
            .page("https://kb.example/content/21/b.html", article_page(&words(150), ""));

        let embedder = MockEmbeddingModel::default();
        embedder.fail_when_contains("POISON");
        let dir = TempDir::new().unwrap();
        let mut crawler = crawler(site, embedder, &dir);

        let outcome = crawler
            .process_article("https://kb.example/content/21/a.html", "intro")
            .await;
        assert_eq!(outcome, ArticleOutcome::EmbeddingFailed);
        let outcome = crawler
            .process_article("https://kb.example/content/21/a.html", "intro")
            .await;
        assert_eq!(outcome, ArticleOutcome::AlreadyVisited);

        crawler.crawl_category(seed).await;
        assert_eq!(crawler.corpus().len(), 1);
        assert_eq!(crawler.corpus()[0].url, "https://kb.example/content/21/b.html");
    }

    #[tokio::test]
    async fn test_empty_embedding_drops_article() {
        let url = "https://kb.example/content/21/a.html";
        let site = StaticSite::default().page(url, article_page(&words(150), ""));

        let dir = TempDir::new().unwrap();
        let mut crawler = crawler(site, MockEmbeddingModel::new(0), &dir);
        let outcome = crawler.process_article(url, "intro").await;

        assert_eq!(outcome, ArticleOutcome::EmbeddingFailed);
        assert!(crawler.corpus().is_empty());
        assert!(crawler.categories().is_empty());
    }

    #[tokio::test]
    async fn test_main_group_fixed_on_first_sight() {
        let pos_seed = "https://kb.example/category/37/handbuch.html";
        let other_seed = "https://kb.example/category/99/handbuch.html";
        let site = StaticSite::default()
            .page(pos_seed, category_page(&[("/content/37/a.html", "A")]))
            .page(other_seed, category_page(&[("/content/99/b.html", "B")]))
            .page("https://kb.example/content/37/a.html", article_page(&words(150), ""))
            .page("https://kb.example/content/99/b.html", article_page(&words(160), ""));

        let dir = TempDir::new().unwrap();
        let mut crawler = crawler(site, MockEmbeddingModel::default(), &dir);
        crawler
            .run(&[pos_seed.to_string(), other_seed.to_string()])
            .await
            .unwrap();

        let category = &crawler.categories()["handbuch"];
        assert_eq!(category.main_group, MainGroup::Pos);
        assert_eq!(category.articles.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_category_does_not_stop_run() {
        let broken = "https://kb.example/category/24/broken.html";
        let working = "https://kb.example/category/25/working.html";
        let site = StaticSite::default()
            .status(broken, 500)
            .page(working, category_page(&[("/content/25/a.html", "A")]))
            .page("https://kb.example/content/25/a.html", article_page(&words(150), ""));

        let dir = TempDir::new().unwrap();
        let mut crawler = crawler(site, MockEmbeddingModel::default(), &dir);
        let summary = crawler
            .run(&[broken.to_string(), working.to_string()])
            .await
            .unwrap();

        assert!(crawler.is_visited(broken));
        assert_eq!(summary.categories_visited, 2);
        assert_eq!(summary.articles_stored, 1);
    }

    #[tokio::test]
    async fn test_links_outside_site_are_ignored() {
        let seed = "https://kb.example/category/21/intro.html";
        let site = StaticSite::default().page(
            seed,
            category_page(&[
                ("https://kb.example.evil/content/1/a.html", "Evil"),
                ("https://other.example/content/1/a.html", "Other"),
                ("/about.html", "About"),
            ]),
        );

        let dir = TempDir::new().unwrap();
        let mut crawler = crawler(site.clone(), MockEmbeddingModel::default(), &dir);
        crawler.crawl_category(seed).await;
        assert_eq!(site.fetched().len(), 1);
    }

    #[tokio::test]
    async fn test_events_are_reported() {
        let seed = "https://kb.example/category/21/intro.html";
        let site = StaticSite::default()
            .page(seed, category_page(&[("/content/21/a.html", "A")]))
            .page("https://kb.example/content/21/a.html", article_page(&words(150), ""));

        let (sender, mut receiver) = mpsc::channel(16);
        let dir = TempDir::new().unwrap();
        let mut crawler = crawler(site, MockEmbeddingModel::default(), &dir).with_events(sender);
        crawler.run(&[seed.to_string()]).await.unwrap();
        drop(crawler);

        let mut events = Vec::new();
        while let Some(event) = receiver.recv().await {
            events.push(event);
        }
        assert!(matches!(events[0], CrawlEvent::CategoryStarted { .. }));
        assert!(matches!(events[1], CrawlEvent::ArticleStored { total: 1, .. }));
        assert!(matches!(events[2], CrawlEvent::Snapshot { articles: 1 }));
    }

    #[test]
    fn test_pagination_labels() {
        assert!(is_pagination_label("Seite 2"));
        assert!(is_pagination_label("→"));
        assert!(is_pagination_label("⇥"));
        assert!(!is_pagination_label("Weiter"));
    }
}
