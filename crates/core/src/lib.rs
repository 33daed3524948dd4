pub mod chunking;
pub mod context;
pub mod embeddings;
pub mod error;
pub mod fusion;
pub mod generation;
pub mod lexical;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod parse;
pub mod prompt;
pub mod reader;
pub mod validate;
pub mod vector;

pub use chunking::{split_chunks, ChunkingConfig};
pub use context::ContextAssembler;
pub use embeddings::{Embedder, HashedTrigramEmbedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use error::{ExtractionError, IngestError};
pub use fusion::{fuse, FusionWeights, RRF_DAMPING};
pub use generation::{
    GenerationBackend, OpenRouterBackend, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
pub use lexical::LexicalIndex;
pub use models::{
    Chunk, Document, DocumentFingerprint, ExtractedRecord, ExtractionOptions, ExtractionRequest,
    FieldRule, FusedResult, RankedResult, CNPJ_PATTERN,
};
pub use normalize::Normalizer;
pub use orchestrator::ExtractionOrchestrator;
pub use parse::{extract_json_span, parse_record};
pub use prompt::{PromptTemplate, DEFAULT_EXTRACTION_RULES};
pub use reader::{DocumentReader, PdfReader, PlainTextReader};
pub use validate::FieldValidator;
pub use vector::VectorIndex;
