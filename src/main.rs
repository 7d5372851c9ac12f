//! # kbcrawl CLI Application
//!
//! This module implements the command-line interface for kbcrawl.
//!
//! ## Key Components
//!
//! - CLI argument parsing with clap
//! - Subcommands:
//!   - `crawl`: Walk the seed categories and write the embedded corpus
//!   - `repair-images`: Rewrite image URLs stored with an article-path prefix
//!   - `list`: Show the per-group indexes of a corpus directory
//!
//! Logs go to stderr (and optionally a rolling file); progress of a crawl is
//! shown with a spinner fed by the crawler's event channel.

mod telemetry;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use kbcrawl::crawler::{
    seeds, ArticleOutcome, Classifier, CrawlEvent, Crawler, CrawlerConfig, HttpFetcher, MainGroup,
    Storage, StorageConfig, StorageError, DEFAULT_SITE_ROOT,
};
use kbcrawl::model::{Client, DEFAULT_EMBEDDING_MODEL};
use tokio::sync::mpsc;
use tracing::instrument;
use url::Url;

#[derive(Parser)]
#[command(author, version, about = "Crawl a knowledge base into a categorized, embedded corpus", long_about = None)]
struct Cli {
    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Export traces and metrics over OTLP/HTTP
    #[arg(long, global = true)]
    otlp: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Crawl the knowledge base and save the corpus
    Crawl(CrawlArgs),

    /// Fix image URLs stored with an article-path prefix
    RepairImages(RepairArgs),

    /// List the main groups and categories of a saved corpus
    List(ListArgs),
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Output directory
    #[arg(short, long, default_value = "kb_data")]
    output: PathBuf,

    /// Root URL of the knowledge base
    #[arg(long, default_value = DEFAULT_SITE_ROOT)]
    site_root: String,

    /// Category URL to crawl instead of the built-in seeds (repeatable)
    #[arg(short, long = "category")]
    category: Vec<String>,

    /// Save a snapshot after this many stored articles
    #[arg(long, default_value = "5")]
    checkpoint_every: usize,

    /// Pause after each page and article request in milliseconds
    #[arg(short, long, default_value = "500")]
    delay_ms: u64,

    /// Pause between seed categories in milliseconds
    #[arg(long, default_value = "1000")]
    seed_delay_ms: u64,

    /// Embedding model to use
    #[arg(short, long, default_value = DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,
}

#[derive(Args, Debug)]
struct RepairArgs {
    /// Corpus directory
    #[arg(short, long, default_value = "kb_data")]
    output: PathBuf,

    /// Root URL the images are served from
    #[arg(long, default_value = DEFAULT_SITE_ROOT)]
    site_root: String,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Corpus directory
    #[arg(short, long, default_value = "kb_data")]
    output: PathBuf,

    /// Show the article count of every category
    #[arg(short, long)]
    details: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _otel = telemetry::init_tracing_subscriber(cli.log_dir.as_deref(), cli.otlp)?;

    match cli.command {
        Some(Commands::Crawl(args)) => {
            crawl_command(args).await?;
        }
        Some(Commands::RepairImages(args)) => {
            repair_command(args).await?;
        }
        Some(Commands::List(args)) => {
            list_command(args).await?;
        }
        None => {
            // If no command is provided, show help
            let _ = Cli::parse_from(["kbcrawl", "--help"]);
        }
    }

    Ok(())
}

fn storage_at(output: PathBuf) -> Storage {
    Storage::with_config(StorageConfig {
        base_path: output,
        ..StorageConfig::default()
    })
}

#[instrument]
async fn crawl_command(args: CrawlArgs) -> anyhow::Result<()> {
    let config = CrawlerConfig::builder()
        .site_root(args.site_root.as_str())
        .request_delay_ms(args.delay_ms)
        .seed_delay_ms(args.seed_delay_ms)
        .checkpoint_interval(args.checkpoint_every)
        .build();

    let seeds = if args.category.is_empty() {
        seeds::all_seed_urls()
    } else {
        args.category.clone()
    };
    println!("Crawling {} categories from {}...", seeds.len(), args.site_root);

    let fetcher = HttpFetcher::new(&config)?;
    let client = Client::new_openai_model_from_env(&args.embedding_model)?;
    let storage = storage_at(args.output.clone());

    // Create a channel for progress updates
    let (progress_sender, mut progress_receiver) = mpsc::channel(100);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    spinner.enable_steady_tick(Duration::from_millis(120));

    // Spawn a task to process progress updates
    let progress_handle = tokio::spawn({
        let spinner = spinner.clone();
        async move {
            let mut skipped = 0;
            while let Some(event) = progress_receiver.recv().await {
                match event {
                    CrawlEvent::CategoryStarted { name, group } => {
                        spinner.set_message(format!("{} / {}", group, name));
                    }
                    CrawlEvent::ArticleStored { url, total } => {
                        spinner.set_message(format!("{} stored, {} skipped: {}", total, skipped, url));
                    }
                    CrawlEvent::ArticleSkipped { outcome, .. } => {
                        if outcome != ArticleOutcome::AlreadyVisited {
                            skipped += 1;
                        }
                    }
                    CrawlEvent::Snapshot { articles } => {
                        spinner.println(format!("Saved snapshot with {} articles", articles));
                    }
                }
            }
        }
    });

    let mut crawler = Crawler::new(
        config,
        fetcher,
        client.embedding().clone(),
        Classifier::default(),
        storage,
    )?
    .with_events(progress_sender);

    let result = crawler.run(&seeds).await;

    // Dropping the crawler closes the channel and ends the progress task
    drop(crawler);
    progress_handle.await?;

    let summary = result?;
    spinner.finish_with_message("Crawl completed");

    println!(
        "Stored {} articles from {} categories ({} pages, {} skipped)",
        summary.articles_stored,
        summary.categories_visited,
        summary.pages_fetched,
        summary.articles_skipped
    );
    println!("Saved corpus to {}", args.output.display());

    Ok(())
}

#[instrument]
async fn repair_command(args: RepairArgs) -> anyhow::Result<()> {
    let site_root = Url::parse(&args.site_root)?;
    let storage = storage_at(args.output);

    let report = storage.repair_images(&site_root).await?;

    println!(
        "Scanned {} files, rewrote {}: fixed {} images in {} articles",
        report.files_scanned, report.files_rewritten, report.images_fixed, report.articles_fixed
    );
    if report.files_failed > 0 {
        println!("{} files could not be repaired, see the log", report.files_failed);
    }

    Ok(())
}

#[instrument]
async fn list_command(args: ListArgs) -> anyhow::Result<()> {
    let storage = storage_at(args.output);

    for group in MainGroup::ALL {
        let index = match storage.load_index(group).await {
            Ok(index) => index,
            Err(StorageError::NotFound(_)) => {
                println!("{}: no data", group);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        println!(
            "{}: {} articles in {} categories",
            group,
            index.total_articles,
            index.categories.len()
        );
        if args.details {
            for (name, count) in &index.categories {
                println!("  {} - {} articles", name, count);
            }
        }
    }

    match storage.load_corpus().await {
        Ok(corpus) => println!("Corpus: {} articles", corpus.len()),
        Err(StorageError::NotFound(_)) => println!("Corpus: missing"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
