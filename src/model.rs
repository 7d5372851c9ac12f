//! # Embedding Client Module
//!
//! The crawler treats the embedding provider as an opaque collaborator: any
//! `rig` `EmbeddingModel` can be plugged in. This module provides the
//! production wiring with built-in rate limiting so a long crawl cannot
//! exhaust the provider quota.
//!
//! ## Key Components
//!
//! - `Client`: Holds the embedding model used by a crawl
//! - `RateLimitedEmbeddingModel`: A wrapper that adds rate limiting to any embedding model
//! - `MockEmbeddingModel`: Deterministic, failure-injectable model for tests
//! - `article_vector`: The `f32` vector persisted for an article

use std::num::NonZeroU32;

use governor::{Quota, RateLimiter};
use ratelimited_embedding::RateLimitedEmbeddingModel;
use rig::{embeddings::EmbeddingModel, providers::openai};

use crate::error::{Error, Result};

pub mod embedding;
pub mod mock_model;
pub mod ratelimited_embedding;

pub use embedding::article_vector;
pub use mock_model::MockEmbeddingModel;

/// Embedding model used when none is configured
pub const DEFAULT_EMBEDDING_MODEL: &str = openai::TEXT_EMBEDDING_3_SMALL;

/// Requests per minute allowed against the embedding provider
const EMBEDDING_REQUESTS_PER_MINUTE: u32 = 3000;

#[derive(Debug, Clone)]
pub struct Client<E>
where
    E: EmbeddingModel,
{
    embedding_model: E,
}

impl Client<RateLimitedEmbeddingModel<openai::EmbeddingModel>> {
    /// Build an OpenAI-backed client from `OPENAI_API_KEY`
    pub fn new_openai_from_env() -> Result<Self> {
        Self::new_openai_model_from_env(DEFAULT_EMBEDDING_MODEL)
    }

    /// Build an OpenAI-backed client for a specific embedding model
    pub fn new_openai_model_from_env(model: &str) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            Error::Config("OPENAI_API_KEY environment variable must be set".to_string())
        })?;
        let openai_client = openai::Client::new(&api_key);
        Self::new_openai(openai_client, model)
    }

    /// Build a client around an existing OpenAI client
    pub fn new_openai(openai_client: openai::Client, model: &str) -> Result<Self> {
        let per_minute = NonZeroU32::new(EMBEDDING_REQUESTS_PER_MINUTE)
            .ok_or_else(|| Error::Config("embedding rate limit must be non-zero".to_string()))?;
        let embedding_limiter = RateLimiter::direct(Quota::per_minute(per_minute));
        let embedding_model = RateLimitedEmbeddingModel::new(
            openai_client.embedding_model(model),
            model,
            embedding_limiter,
        );
        Ok(Self { embedding_model })
    }
}

impl<E> Client<E>
where
    E: EmbeddingModel,
{
    /// Wrap an arbitrary embedding model
    pub fn new(embedding_model: E) -> Self {
        Self { embedding_model }
    }

    /// The embedding model of this client
    pub fn embedding(&self) -> &E {
        &self.embedding_model
    }
}
