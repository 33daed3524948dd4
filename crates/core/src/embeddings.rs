use crate::error::ExtractionError;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 128;

/// Maps text into a fixed-dimension vector space. Implementations must be
/// deterministic for identical input text.
pub trait Embedder {
    fn dimensions(&self) -> usize;
    fn embed(&self, text: &str) -> Result<Vec<f32>, ExtractionError>;
}

/// Local hashed character-trigram embedder. No model download, no network,
/// fully deterministic, good enough to separate topically distinct chunks.
#[derive(Debug, Clone, Copy)]
pub struct HashedTrigramEmbedder {
    dimensions: usize,
}

impl HashedTrigramEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }
}

impl Default for HashedTrigramEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIMENSIONS)
    }
}

impl Embedder for HashedTrigramEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, ExtractionError> {
        let mut vector = vec![0f32; self.dimensions];
        let lowered = text.to_lowercase();
        let characters: Vec<char> = lowered.chars().collect();

        if characters.len() < 3 {
            if !characters.is_empty() {
                let bucket = (fnv1a(&lowered) % vector.len() as u64) as usize;
                vector[bucket] = 1.0;
            }
            return Ok(vector);
        }

        for window in characters.windows(3) {
            let trigram: String = window.iter().collect();
            let bucket = (fnv1a(&trigram) % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector
            .iter()
            .map(|value| value * value)
            .sum::<f32>()
            .sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        Ok(vector)
    }
}

fn fnv1a(token: &str) -> u64 {
    let mut hash = 1469598103934665603u64;
    for byte in token.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(1099511628211);
    }
    hash
}
