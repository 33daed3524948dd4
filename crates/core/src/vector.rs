use crate::embeddings::Embedder;
use crate::error::ExtractionError;
use crate::models::{Chunk, RankedResult};

/// In-memory vector index: every chunk embedded once at build time, the
/// query embedded with the same embedder, cosine similarity for ranking.
pub struct VectorIndex<E: Embedder> {
    embedder: E,
    vectors: Vec<(usize, Vec<f32>)>,
}

impl<E: Embedder> VectorIndex<E> {
    /// Embedding every chunk is the expensive part of the build; it stays a
    /// synchronous black-box call into the embedder.
    pub fn build(embedder: E, chunks: &[Chunk]) -> Result<Self, ExtractionError> {
        let mut vectors = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            vectors.push((chunk.id, embedder.embed(&chunk.text)?));
        }
        Ok(Self { embedder, vectors })
    }

    /// Top `top_k` chunks by cosine similarity descending, ties by
    /// ascending chunk id.
    pub fn query(&self, query: &str, top_k: usize) -> Result<Vec<RankedResult>, ExtractionError> {
        let query_vector = self.embedder.embed(query)?;

        let mut scored: Vec<(usize, f64)> = self
            .vectors
            .iter()
            .map(|(chunk_id, vector)| (*chunk_id, cosine_similarity(&query_vector, vector)))
            .collect();

        scored.sort_by(|left, right| {
            right
                .1
                .total_cmp(&left.1)
                .then_with(|| left.0.cmp(&right.0))
        });

        Ok(scored
            .into_iter()
            .take(top_k)
            .enumerate()
            .map(|(position, (chunk_id, score))| RankedResult {
                chunk_id,
                score,
                rank: position + 1,
            })
            .collect())
    }
}

pub fn cosine_similarity(left: &[f32], right: &[f32]) -> f64 {
    let mut dot = 0f64;
    let mut left_norm = 0f64;
    let mut right_norm = 0f64;

    for (a, b) in left.iter().zip(right.iter()) {
        dot += f64::from(*a) * f64::from(*b);
        left_norm += f64::from(*a) * f64::from(*a);
        right_norm += f64::from(*b) * f64::from(*b);
    }

    let denominator = left_norm.sqrt() * right_norm.sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        dot / denominator
    }
}
