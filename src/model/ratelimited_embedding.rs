//! Quota-gated embedding model wrapper
//!
//! Every request waits for a `governor` permit before reaching the provider.

use std::sync::Arc;

use governor::DefaultDirectRateLimiter;
use rig::embeddings::{Embedding, EmbeddingError, EmbeddingModel};
use tracing::{debug_span, info_span, warn, Instrument};

/// Embedding model that waits for a provider quota permit before every request
#[derive(Clone)]
pub struct RateLimitedEmbeddingModel<M: EmbeddingModel> {
    model: M,
    name: String,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl<M: EmbeddingModel> std::fmt::Debug for RateLimitedEmbeddingModel<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitedEmbeddingModel")
            .field("name", &self.name)
            .field("ndims", &self.model.ndims())
            .finish_non_exhaustive()
    }
}

impl<M> RateLimitedEmbeddingModel<M>
where
    M: EmbeddingModel,
{
    pub fn new(model: M, name: impl Into<String>, limiter: DefaultDirectRateLimiter) -> Self {
        Self {
            model,
            name: name.into(),
            limiter: Arc::new(limiter),
        }
    }

    /// Name of the wrapped provider model
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<M: EmbeddingModel> EmbeddingModel for RateLimitedEmbeddingModel<M> {
    const MAX_DOCUMENTS: usize = M::MAX_DOCUMENTS;

    fn ndims(&self) -> usize {
        self.model.ndims()
    }

    async fn embed_texts(
        &self,
        texts: impl IntoIterator<Item = String> + Send,
    ) -> Result<Vec<Embedding>, EmbeddingError> {
        let texts: Vec<String> = texts.into_iter().collect();
        let chars: usize = texts.iter().map(|text| text.chars().count()).sum();

        self.limiter
            .until_ready()
            .instrument(debug_span!("quota", model = %self.name))
            .await;

        let result = self
            .model
            .embed_texts(texts)
            .instrument(info_span!("embed_texts", model = %self.name, chars))
            .await;
        if let Err(e) = &result {
            warn!("{} rejected {} characters: {}", self.name, chars, e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MockEmbeddingModel;
    use governor::{Quota, RateLimiter};
    use std::num::NonZeroU32;

    fn limiter() -> DefaultDirectRateLimiter {
        RateLimiter::direct(Quota::per_second(NonZeroU32::new(100).unwrap()))
    }

    #[tokio::test]
    async fn test_rate_limited_model_delegates() {
        let inner = MockEmbeddingModel::new(3);
        let model = RateLimitedEmbeddingModel::new(inner.clone(), "mock", limiter());

        let embedding = model.embed_text("hello").await.unwrap();
        assert_eq!(embedding.vec.len(), 3);
        assert_eq!(model.ndims(), 3);
        assert_eq!(model.name(), "mock");
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_rate_limited_model_passes_errors_through() {
        let inner = MockEmbeddingModel::new(3);
        inner.fail_when_contains("POISON");
        let model = RateLimitedEmbeddingModel::new(inner, "mock", limiter());

        assert!(model.embed_text("POISON text").await.is_err());
    }
}
