use crate::chunking::split_chunks;
use crate::context::ContextAssembler;
use crate::embeddings::Embedder;
use crate::error::{ExtractionError, IngestError};
use crate::fusion::{fuse, FusionWeights};
use crate::generation::GenerationBackend;
use crate::lexical::LexicalIndex;
use crate::models::{Chunk, Document, ExtractedRecord, ExtractionOptions, ExtractionRequest};
use crate::normalize::Normalizer;
use crate::parse::parse_record;
use crate::prompt::PromptTemplate;
use crate::reader::DocumentReader;
use crate::validate::FieldValidator;
use crate::vector::VectorIndex;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Drives one extraction run end to end: read, normalize, chunk, retrieve,
/// assemble, generate, parse, validate, persist. Strictly sequential; all
/// state is owned by the run, nothing is shared across invocations.
pub struct ExtractionOrchestrator<R, E, G>
where
    R: DocumentReader,
    E: Embedder + Clone,
    G: GenerationBackend,
{
    reader: R,
    embedder: E,
    backend: G,
    options: ExtractionOptions,
    normalizer: Normalizer,
    template: PromptTemplate,
    validator: FieldValidator,
}

impl<R, E, G> ExtractionOrchestrator<R, E, G>
where
    R: DocumentReader,
    E: Embedder + Clone,
    G: GenerationBackend,
{
    pub fn new(
        reader: R,
        embedder: E,
        backend: G,
        options: ExtractionOptions,
    ) -> Result<Self, IngestError> {
        let normalizer = Normalizer::new()?;
        let validator = FieldValidator::from_rules(&options.field_rules)?;
        let template = PromptTemplate::new(options.rules.clone());

        Ok(Self {
            reader,
            embedder,
            backend,
            options,
            normalizer,
            template,
            validator,
        })
    }

    /// Reads the input document, runs the pipeline and writes the record to
    /// `output` as pretty-printed JSON. The output file is written only
    /// after the whole pipeline succeeded; on any earlier failure a
    /// pre-existing file at the target path is left untouched.
    pub async fn run(
        &self,
        request: &ExtractionRequest,
        input: &Path,
        output: &Path,
    ) -> Result<ExtractedRecord, ExtractionError> {
        info!(input = %input.display(), "reading document");
        let raw_text = self.reader.read(input)?;

        let record = self.extract(request, &raw_text).await?;

        let mut payload = serde_json::to_string_pretty(&record)?;
        payload.push('\n');
        fs::write(output, payload).map_err(|source| ExtractionError::OutputWrite {
            path: output.display().to_string(),
            source,
        })?;

        info!(output = %output.display(), "extraction completed");
        Ok(record)
    }

    /// The I/O-free core of the pipeline, from raw text to validated record.
    pub async fn extract(
        &self,
        request: &ExtractionRequest,
        raw_text: &str,
    ) -> Result<ExtractedRecord, ExtractionError> {
        let document = Document::new(self.normalizer.normalize(raw_text));
        let fingerprint = document.fingerprint();
        info!(
            checksum = %fingerprint.checksum,
            chars = fingerprint.chars,
            "document normalized"
        );

        let chunks = split_chunks(document.text(), &self.options.chunking)?;
        info!(chunk_count = chunks.len(), "document chunked");

        let lexical_index = LexicalIndex::build(&chunks);
        let vector_index = VectorIndex::build(self.embedder.clone(), &chunks)?;

        let lexical_hits = lexical_index.query(&request.retrieval_query, self.options.top_k);
        let vector_hits = vector_index.query(&request.retrieval_query, self.options.top_k)?;
        let fused = fuse(
            &lexical_hits,
            &vector_hits,
            FusionWeights {
                lexical: self.options.lexical_weight,
                vector: self.options.vector_weight,
            },
        );
        info!(
            lexical_hits = lexical_hits.len(),
            vector_hits = vector_hits.len(),
            fused = fused.len(),
            "retrieval finished"
        );

        let selected: Vec<&Chunk> = fused
            .iter()
            .filter_map(|result| chunks.get(result.chunk_id))
            .collect();

        for (position, chunk) in selected.iter().enumerate() {
            let preview: String = chunk.text.chars().take(300).collect();
            debug!(rank = position + 1, chunk_id = chunk.id, preview = %preview, "fused chunk");
        }

        let assembler = ContextAssembler::new(
            self.options.head_chars,
            self.options.head_label.clone(),
            self.options.retrieved_label.clone(),
        );
        let context = assembler.assemble(document.text(), &selected);

        let prompt = self
            .template
            .render(&request.persona, &context, &request.fields_to_extract);
        info!(prompt_chars = prompt.chars().count(), "invoking generation backend");

        let raw_output = self.backend.generate(&prompt).await?;
        debug!(output_chars = raw_output.chars().count(), raw_output = %raw_output, "backend output");

        let mut record = parse_record(&raw_output, &request.fields_to_extract)?;
        self.validator.apply(&mut record);

        Ok(record)
    }
}
