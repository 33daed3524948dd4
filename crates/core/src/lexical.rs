use crate::models::{Chunk, RankedResult};
use std::collections::HashMap;

const K1: f64 = 1.2;
const B: f64 = 0.75;

/// In-memory BM25 index over the chunk collection. Built once per run.
#[derive(Debug)]
pub struct LexicalIndex {
    /// Per chunk: (chunk id, token count, term frequencies).
    documents: Vec<(usize, usize, HashMap<String, usize>)>,
    document_frequency: HashMap<String, usize>,
    average_length: f64,
}

impl LexicalIndex {
    pub fn build(chunks: &[Chunk]) -> Self {
        let mut documents = Vec::with_capacity(chunks.len());
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        let mut total_tokens = 0usize;

        for chunk in chunks {
            let tokens = tokenize(&chunk.text);
            total_tokens += tokens.len();

            let mut term_frequency: HashMap<String, usize> = HashMap::new();
            for token in tokens {
                *term_frequency.entry(token).or_insert(0) += 1;
            }

            for term in term_frequency.keys() {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }

            documents.push((chunk.id, term_frequency.values().sum::<usize>(), term_frequency));
        }

        let average_length = if documents.is_empty() {
            0.0
        } else {
            total_tokens as f64 / documents.len() as f64
        };

        Self {
            documents,
            document_frequency,
            average_length,
        }
    }

    /// Top `top_k` chunks by BM25 score descending, ties by ascending chunk
    /// id. Chunks with no lexical overlap with the query are never returned.
    pub fn query(&self, query: &str, top_k: usize) -> Vec<RankedResult> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() || self.documents.is_empty() {
            return Vec::new();
        }

        let total_documents = self.documents.len() as f64;
        let mut scored: Vec<(usize, f64)> = Vec::new();

        for (chunk_id, length, term_frequency) in &self.documents {
            let mut score = 0.0;
            for token in &query_tokens {
                let Some(frequency) = term_frequency.get(token) else {
                    continue;
                };
                let matching = self
                    .document_frequency
                    .get(token)
                    .copied()
                    .unwrap_or(1) as f64;

                // Lucene-style idf, always non-negative.
                let idf = (1.0 + (total_documents - matching + 0.5) / (matching + 0.5)).ln();
                let frequency = *frequency as f64;
                let normalized_length = *length as f64 / self.average_length.max(1e-9);
                score += idf * (frequency * (K1 + 1.0))
                    / (frequency + K1 * (1.0 - B + B * normalized_length));
            }

            if score > 0.0 {
                scored.push((*chunk_id, score));
            }
        }

        scored.sort_by(|left, right| {
            right
                .1
                .total_cmp(&left.1)
                .then_with(|| left.0.cmp(&right.0))
        });

        scored
            .into_iter()
            .take(top_k)
            .enumerate()
            .map(|(position, (chunk_id, score))| RankedResult {
                chunk_id,
                score,
                rank: position + 1,
            })
            .collect()
    }
}

pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|character: char| !character.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| token.to_lowercase())
        .collect()
}
