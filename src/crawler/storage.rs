//! JSON persistence of crawl state
//!
//! Layout under the base path:
//!
//! - `<group>/categories/<category>.json`: articles of one category
//! - `<group>/categories/index.json`: per-group summary
//! - `<corpus_file>`: every article in storage order
//!
//! Category stems that would collide with the index record are escaped with
//! a leading `_`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::{io, path::Path, path::PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

use super::classify::MainGroup;
use super::{Article, Category};

/// Name of the per-group summary record
const INDEX_FILE: &str = "index.json";

/// File stem of the per-group summary record
const INDEX_STEM: &str = "index";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Base path for storage
    pub base_path: PathBuf,

    /// File name of the flat corpus, relative to `base_path`
    pub corpus_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("kb_data"),
            corpus_file: "articles_with_embeddings.json".to_string(),
        }
    }
}

/// Summary record written next to the category files of a main group
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GroupIndex {
    /// Group the categories belong to
    pub main_category: MainGroup,

    /// Sum of the per-category counts
    pub total_articles: usize,

    /// Article count per category name
    pub categories: BTreeMap<String, usize>,
}

/// What a snapshot wrote
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    /// Main groups with at least one non-empty category
    pub groups: usize,

    /// Category files written
    pub categories: usize,

    /// Articles in the flat corpus
    pub articles: usize,
}

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

type Result<T> = std::result::Result<T, StorageError>;

/// Storage manager for crawled categories
///
/// Every write goes to a temporary sibling first and is renamed into place,
/// so readers only ever see complete files.
#[derive(Debug, Clone)]
pub struct Storage {
    config: StorageConfig,
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage {
    /// Create a new storage with default configuration
    pub fn new() -> Self {
        Self {
            config: StorageConfig::default(),
        }
    }

    /// Create a new storage with custom configuration
    pub fn with_config(config: StorageConfig) -> Self {
        Self { config }
    }

    /// Directory holding the category files of a main group
    pub fn group_dir(&self, group: MainGroup) -> PathBuf {
        self.config.base_path.join(group.as_str()).join("categories")
    }

    /// Path of a category file
    pub fn category_path(&self, group: MainGroup, category: &str) -> PathBuf {
        self.group_dir(group)
            .join(format!("{}.json", category_file_stem(category)))
    }

    /// Path of the index record of a main group
    pub fn index_path(&self, group: MainGroup) -> PathBuf {
        self.group_dir(group).join(INDEX_FILE)
    }

    /// Path of the flat corpus file
    pub fn corpus_path(&self) -> PathBuf {
        self.config.base_path.join(&self.config.corpus_file)
    }

    /// Creates necessary directories for storage
    async fn ensure_directories(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Replace `path` with the JSON form of `value`
    pub(crate) async fn write_json<T>(&self, path: &Path, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.ensure_directories(path).await?;
        let json = serde_json::to_vec_pretty(value)?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp_path = path.with_file_name(format!(
            ".{}.{}.{}.tmp",
            file_name,
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        if let Err(e) = write_synced(&temp_path, &json).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&temp_path, path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }
        debug!("Wrote {}", path.display());
        Ok(())
    }

    pub(crate) async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = match fs::read(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&content)?)
    }

    /// Write the complete current state of every category and the flat corpus
    ///
    /// Category files are fully replaced, never appended to. Groups without
    /// a non-empty category are left untouched.
    #[instrument(skip_all, fields(categories = categories.len(), articles = corpus.len()))]
    pub async fn snapshot(
        &self,
        categories: &BTreeMap<String, Category>,
        corpus: &[Article],
    ) -> Result<SnapshotReport> {
        let mut report = SnapshotReport::default();

        for group in MainGroup::ALL {
            let members: Vec<&Category> = categories
                .values()
                .filter(|category| category.main_group == group && !category.is_empty())
                .collect();
            if members.is_empty() {
                continue;
            }

            let mut index = GroupIndex {
                main_category: group,
                total_articles: 0,
                categories: BTreeMap::new(),
            };
            for category in members {
                self.write_json(&self.category_path(group, &category.name), &category.articles)
                    .await?;
                index.total_articles += category.len();
                index.categories.insert(category.name.clone(), category.len());
                report.categories += 1;
            }

            self.write_json(&self.index_path(group), &index).await?;
            info!(
                "Saved {} {} articles in {} categories",
                index.total_articles,
                group,
                index.categories.len()
            );
            report.groups += 1;
        }

        self.write_json(&self.corpus_path(), corpus).await?;
        report.articles = corpus.len();

        Ok(report)
    }

    /// Loads the index record of a main group
    pub async fn load_index(&self, group: MainGroup) -> Result<GroupIndex> {
        self.read_json(&self.index_path(group)).await
    }

    /// Loads the articles of one category
    pub async fn load_category(&self, group: MainGroup, category: &str) -> Result<Vec<Article>> {
        self.read_json(&self.category_path(group, category)).await
    }

    /// Loads the flat corpus
    pub async fn load_corpus(&self) -> Result<Vec<Article>> {
        self.read_json(&self.corpus_path()).await
    }

    /// Lists the category files of a main group, index excluded
    pub async fn category_files(&self, group: MainGroup) -> Result<Vec<PathBuf>> {
        let dir = self.group_dir(group);
        if !fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut dir_entries = fs::read_dir(dir).await?;
        while let Some(entry) = dir_entries.next_entry().await? {
            let path = entry.path();
            let is_json = path.extension().is_some_and(|ext| ext == "json");
            let is_index = path.file_name().is_some_and(|name| name == INDEX_FILE);
            if is_json && !is_index {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// File stem for a category name
///
/// Path separators and NUL become `_`. A stem equal to the index stem, or one
/// already starting with `_`, gets a leading `_`, so no category can map onto
/// `index.json` and escaped stems stay distinct.
fn category_file_stem(category: &str) -> String {
    let stem: String = category
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    if stem.eq_ignore_ascii_case(INDEX_STEM) || stem.starts_with('_') {
        format!("_{}", stem)
    } else {
        stem
    }
}

/// Write `contents` to a new file and flush it to disk
async fn write_synced(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(contents).await?;
    file.sync_all().await
}
