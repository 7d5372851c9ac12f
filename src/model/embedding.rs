use rig::embeddings::Embedding;

/// The `f32` vector persisted for an article
///
/// `None` when the provider answered with an empty vector or one holding a
/// non-finite component; such an answer counts as a failed embedding.
pub fn article_vector(embedding: &Embedding) -> Option<Vec<f32>> {
    if embedding.vec.is_empty() {
        return None;
    }
    let vector: Vec<f32> = embedding.vec.iter().map(|f| *f as f32).collect();
    vector.iter().all(|f| f.is_finite()).then_some(vector)
}
