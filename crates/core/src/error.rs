use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("document read error: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("ingest failed: {0}")]
    Ingest(#[from] IngestError),

    #[error("embedding backend failure: {0}")]
    Embedding(String),

    #[error("generation backend failure: {0}")]
    Generation(String),

    #[error("generation backend timed out after {0:?}")]
    GenerationTimeout(Duration),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("no JSON object found in model output; raw output: {raw}")]
    NoJsonFound { raw: String },

    #[error("malformed JSON in model output: {details}; raw output: {raw}")]
    MalformedJson { details: String, raw: String },

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("output write error: {path}: {source}")]
    OutputWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = ExtractionError> = std::result::Result<T, E>;
