//! # Mock Embedding Model for Testing
//!
//! Provides a `MockEmbeddingModel` that implements the `EmbeddingModel` trait
//! without network access. Vectors are derived from the input text, so equal
//! texts get equal vectors, and texts containing a configured marker fail the
//! way a provider error would.

use rig::embeddings::{Embedding, EmbeddingError, EmbeddingModel};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A deterministic embedding model for tests
#[derive(Debug, Clone)]
pub struct MockEmbeddingModel {
    ndims: usize,
    /// Texts containing this marker fail to embed
    fail_marker: Arc<Mutex<Option<String>>>,
    calls: Arc<AtomicUsize>,
}

impl MockEmbeddingModel {
    /// Creates a mock producing vectors of `ndims` dimensions
    pub fn new(ndims: usize) -> Self {
        Self {
            ndims,
            fail_marker: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Makes every text containing `marker` fail to embed
    pub fn fail_when_contains(&self, marker: impl Into<String>) {
        if let Ok(mut guard) = self.fail_marker.lock() {
            *guard = Some(marker.into());
        }
    }

    /// Number of texts submitted so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn should_fail(&self, text: &str) -> bool {
        self.fail_marker
            .lock()
            .map(|guard| guard.as_deref().is_some_and(|marker| text.contains(marker)))
            .unwrap_or(false)
    }

    fn vector_for(&self, text: &str) -> Vec<f64> {
        let bytes = text.as_bytes();
        (0..self.ndims)
            .map(|i| {
                let byte = bytes.get(i % bytes.len().max(1)).copied().unwrap_or(0);
                f64::from(byte) / 255.0
            })
            .collect()
    }
}

impl Default for MockEmbeddingModel {
    fn default() -> Self {
        Self::new(8)
    }
}

impl EmbeddingModel for MockEmbeddingModel {
    const MAX_DOCUMENTS: usize = 1024;

    fn ndims(&self) -> usize {
        self.ndims
    }

    async fn embed_texts(
        &self,
        texts: impl IntoIterator<Item = String> + Send,
    ) -> Result<Vec<Embedding>, EmbeddingError> {
        let texts: Vec<String> = texts.into_iter().collect();
        self.calls.fetch_add(texts.len(), Ordering::SeqCst);

        if let Some(failing) = texts.iter().find(|text| self.should_fail(text)) {
            return Err(EmbeddingError::ProviderError(format!(
                "mock refused to embed {} characters",
                failing.len()
            )));
        }

        Ok(texts
            .into_iter()
            .map(|document| Embedding {
                vec: self.vector_for(&document),
                document,
            })
            .collect())
    }
}
