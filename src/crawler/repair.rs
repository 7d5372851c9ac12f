//! Repair of image URLs persisted with the article-path prefix
//!
//! Older crawls resolved root-relative images against the article URL and
//! stored them as `<root>/content/23/27/de/images/...`. The site serves them
//! from `<root>/images/...`; this pass rewrites stored records in place.

use std::path::Path;

use tracing::{info, instrument, warn};
use url::Url;

use super::Article;
use super::classify::MainGroup;
use super::normalize::ARTICLE_MARKER;
use super::storage::{Storage, StorageError};

const IMAGES_SEGMENT: &str = "/images/";

/// Counts of what a repair pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Files read
    pub files_scanned: usize,

    /// Files rewritten because at least one URL changed
    pub files_rewritten: usize,

    /// Articles with at least one corrected image
    pub articles_fixed: usize,

    /// Image URLs corrected
    pub images_fixed: usize,

    /// Files that could not be read, parsed or rewritten
    pub files_failed: usize,
}

/// Corrected form of a prefixed image URL, `None` when it needs no repair
pub fn repair_image_url(url: &str, site_root: &Url) -> Option<String> {
    if !url.contains(ARTICLE_MARKER) {
        return None;
    }
    let start = url.find(IMAGES_SEGMENT)?;
    let rest = &url[start + IMAGES_SEGMENT.len()..];
    if rest.is_empty() {
        return None;
    }
    site_root
        .join(&format!("{}{}", IMAGES_SEGMENT, rest))
        .ok()
        .map(String::from)
}

/// Repair the images of `articles` in place, returning (articles, images) fixed
pub fn repair_articles(articles: &mut [Article], site_root: &Url) -> (usize, usize) {
    let mut articles_fixed = 0;
    let mut images_fixed = 0;

    for article in articles.iter_mut() {
        let mut fixed_here = 0;
        for image in article.images.iter_mut() {
            if let Some(corrected) = repair_image_url(image, site_root) {
                *image = corrected;
                fixed_here += 1;
            }
        }
        if fixed_here > 0 {
            articles_fixed += 1;
            images_fixed += fixed_here;
        }
    }

    (articles_fixed, images_fixed)
}

impl Storage {
    /// Repair image URLs in every category file and in the flat corpus
    ///
    /// A file that fails is logged and counted; the pass moves on to the
    /// next one. Only failing to list a group directory aborts.
    #[instrument(skip(self))]
    pub async fn repair_images(&self, site_root: &Url) -> Result<RepairReport, StorageError> {
        let mut report = RepairReport::default();

        for group in MainGroup::ALL {
            for path in self.category_files(group).await? {
                if let Err(e) = self.repair_file(&path, site_root, &mut report).await {
                    warn!("Could not repair {}: {}", path.display(), e);
                    report.files_failed += 1;
                }
            }
        }

        let corpus = self.corpus_path();
        match self.repair_file(&corpus, site_root, &mut report).await {
            Ok(()) => {}
            Err(StorageError::NotFound(_)) => {
                warn!("No corpus file at {}, skipping", corpus.display());
            }
            Err(e) => {
                warn!("Could not repair {}: {}", corpus.display(), e);
                report.files_failed += 1;
            }
        }

        info!(
            "Repaired {} images in {} articles across {} files",
            report.images_fixed, report.articles_fixed, report.files_rewritten
        );
        Ok(report)
    }

    async fn repair_file(
        &self,
        path: &Path,
        site_root: &Url,
        report: &mut RepairReport,
    ) -> Result<(), StorageError> {
        let mut articles: Vec<Article> = self.read_json(path).await?;
        report.files_scanned += 1;

        let (articles_fixed, images_fixed) = repair_articles(&mut articles, site_root);
        if images_fixed > 0 {
            self.write_json(path, &articles).await?;
            report.files_rewritten += 1;
            report.articles_fixed += articles_fixed;
            report.images_fixed += images_fixed;
            info!("Fixed {} images in {}", images_fixed, path.display());
        }
        Ok(())
    }
}
