use chrono::Utc;
use clap::Parser;
use pdf_extract_core::{
    DocumentReader, ExtractionOptions, ExtractionOrchestrator, ExtractionRequest,
    HashedTrigramEmbedder, OpenRouterBackend, PdfReader, PlainTextReader, DEFAULT_BASE_URL,
    DEFAULT_MODEL,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_PERSONA: &str =
    "Você é um assistente especializado em análise de documentos financeiros brasileiros.";

const DEFAULT_RETRIEVAL_QUERY: &str = "\
CNPJ do Devedor
Nome do Devedor
Data de Emissão
Termo de Securitização
Emitido em
Devedor:
CNPJ:";

const DEFAULT_FIELDS: [&str; 3] = ["cnpj_devedor", "nome_devedor", "data_emissao"];

#[derive(Parser)]
#[command(name = "pdf-field-extract", version)]
struct Cli {
    /// Input document path (.pdf, or plain text for anything else).
    #[arg(short = 'p', long)]
    pdf: PathBuf,

    /// Output JSON artifact path. Overwritten on success.
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// OpenAI-compatible base URL.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Model identifier for the generation backend.
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// API key for the generation backend.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Generation call timeout in seconds.
    #[arg(long, default_value = "120")]
    timeout_secs: u64,

    /// Field to extract; repeat for several. Defaults to the CRI field set.
    #[arg(long = "field")]
    fields: Vec<String>,
}

/// Picks the reader from the file extension so the same binary handles
/// extracted-text fixtures as well as real PDFs.
enum AnyReader {
    Pdf(PdfReader),
    Text(PlainTextReader),
}

impl DocumentReader for AnyReader {
    fn read(&self, path: &Path) -> Result<String, pdf_extract_core::IngestError> {
        match self {
            AnyReader::Pdf(reader) => reader.read(path),
            AnyReader::Text(reader) => reader.read(path),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        input = %cli.pdf.display(),
        output = %cli.output.display(),
        "pdf-field-extract boot"
    );

    let fields = if cli.fields.is_empty() {
        DEFAULT_FIELDS.iter().map(|field| (*field).to_string()).collect()
    } else {
        cli.fields.clone()
    };

    let request = ExtractionRequest {
        fields_to_extract: fields,
        persona: DEFAULT_PERSONA.to_string(),
        retrieval_query: DEFAULT_RETRIEVAL_QUERY.to_string(),
    };

    let is_pdf = cli
        .pdf
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("pdf"));
    let reader = if is_pdf {
        AnyReader::Pdf(PdfReader)
    } else {
        AnyReader::Text(PlainTextReader)
    };

    let backend = OpenRouterBackend::new(&cli.base_url, &cli.api_key)
        .map_err(|error| anyhow::anyhow!(error.to_string()))?
        .with_model(cli.model.clone())
        .with_timeout(Duration::from_secs(cli.timeout_secs));

    let orchestrator = ExtractionOrchestrator::new(
        reader,
        HashedTrigramEmbedder::default(),
        backend,
        ExtractionOptions::default(),
    )
    .map_err(|error| anyhow::anyhow!(error.to_string()))?;

    // NoJsonFound/MalformedJson carry the raw model output for diagnosis.
    let record = orchestrator
        .run(&request, &cli.pdf, &cli.output)
        .await
        .map_err(|error| anyhow::anyhow!("extraction failed: {error}"))?;

    for (field, value) in record.iter() {
        println!("{field}: {}", value.unwrap_or("null"));
    }
    println!("extraction completed at {}", Utc::now().to_rfc3339());

    Ok(())
}
