use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::chunking::ChunkingConfig;

/// A normalized document. The text is never mutated after construction.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
}

impl Document {
    pub fn new(normalized_text: String) -> Self {
        Self {
            text: normalized_text,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn fingerprint(&self) -> DocumentFingerprint {
        let mut hasher = Sha256::new();
        hasher.update(self.text.as_bytes());
        DocumentFingerprint {
            checksum: format!("{:x}", hasher.finalize()),
            chars: self.text.chars().count(),
            parsed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFingerprint {
    pub checksum: String,
    pub chars: usize,
    pub parsed_at: DateTime<Utc>,
}

/// A contiguous slice of the normalized document text, the unit of retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Stable id in assignment order.
    pub id: usize,
    pub text: String,
    /// Byte offset of this chunk's span in the normalized text.
    pub source_offset: usize,
}

/// One retriever's hit. Scores are retriever-local and not comparable
/// across retrievers without fusion.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub chunk_id: usize,
    pub score: f64,
    /// 1-indexed rank within the retriever's own list.
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FusedResult {
    pub chunk_id: usize,
    pub fused_score: f64,
}

/// Immutable per-run description of what to extract.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    /// Unique field names, in output order.
    pub fields_to_extract: Vec<String>,
    pub persona: String,
    pub retrieval_query: String,
}

/// The extracted output: every requested field is present, in request
/// order, with `None` for anything absent or invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRecord {
    values: Vec<(String, Option<String>)>,
}

impl ExtractedRecord {
    pub fn new(fields: &[String]) -> Self {
        Self {
            values: fields.iter().map(|field| (field.clone(), None)).collect(),
        }
    }

    pub fn set(&mut self, field: &str, value: Option<String>) {
        if let Some(entry) = self.values.iter_mut().find(|(name, _)| name == field) {
            entry.1 = value;
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }
}

impl Serialize for ExtractedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Validation rule for one field: a value that does not match the pattern
/// is coerced to null instead of rejecting the whole record.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: String,
    pub pattern: String,
}

/// Brazilian CNPJ tax id, e.g. `12.345.678/0001-99`. Unanchored on purpose.
pub const CNPJ_PATTERN: &str = r"\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}";

#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    pub chunking: ChunkingConfig,
    /// Results requested from each retriever.
    pub top_k: usize,
    pub lexical_weight: f64,
    pub vector_weight: f64,
    /// Head excerpt budget in characters.
    pub head_chars: usize,
    pub head_label: String,
    pub retrieved_label: String,
    /// Mandatory rules embedded in every prompt.
    pub rules: String,
    pub field_rules: Vec<FieldRule>,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            top_k: 6,
            lexical_weight: 0.7,
            vector_weight: 0.3,
            head_chars: 15_000,
            head_label: "TRECHO INICIAL DO DOCUMENTO:".to_string(),
            retrieved_label: "TRECHOS RECUPERADOS POR BUSCA:".to_string(),
            rules: crate::prompt::DEFAULT_EXTRACTION_RULES.to_string(),
            field_rules: vec![FieldRule {
                field: "cnpj_devedor".to_string(),
                pattern: CNPJ_PATTERN.to_string(),
            }],
        }
    }
}
