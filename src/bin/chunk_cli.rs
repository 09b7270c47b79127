use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser as ClapParser;
use serde::Serialize;
use serde_json::json;
use tokenchunk::{
    Chunker, ChunkRecord, ChunkerConfig, ContentType, Parser as TokenChunkParser,
    ProcessingError, RoutableSubmission, SourceRouter,
};

/// Thin command-line adapter over the library's `SourceRouter`/`Chunker`;
/// it carries no chunking logic of its own.
#[derive(ClapParser, Debug)]
#[command(name = "chunk-cli", about = "Chunk a text file into token-bounded segments")]
struct Args {
    /// Input file path.
    #[arg(long)]
    file: String,

    /// Target chunk size in tokens.
    #[arg(long = "chunk_tokens", default_value_t = 900)]
    chunk_tokens: usize,

    /// Overlap size in tokens.
    #[arg(long, default_value_t = 200)]
    overlap: usize,

    /// Treat the input as paginated, splitting on form-feed characters.
    #[arg(long = "is_pdf")]
    is_pdf: bool,

    /// Output JSON file path.
    #[arg(long)]
    out: String,
}

/// Harness-grade parser for the CLI: real PDF byte parsing is out of
/// scope, so `--is_pdf` is served by treating form-feed characters as page
/// delimiters in an already-decoded UTF-8 text file.
struct FormFeedParser {
    text: String,
}

#[async_trait]
impl TokenChunkParser for FormFeedParser {
    async fn extract_pdf_pages(&self, _path: &str) -> Result<Vec<String>, ProcessingError> {
        Ok(self.text.split('\x0C').map(str::to_string).collect())
    }

    async fn parse_docx(&self, _path: &str) -> Result<String, ProcessingError> {
        Ok(self.text.clone())
    }
}

#[derive(Serialize)]
struct CliChunk {
    chunk_index: usize,
    text: String,
    token_count: usize,
    start_token: usize,
    end_token: usize,
    page_number: Option<usize>,
    metadata: serde_json::Map<String, serde_json::Value>,
}

impl From<ChunkRecord> for CliChunk {
    fn from(chunk: ChunkRecord) -> Self {
        Self {
            chunk_index: chunk.chunk_index,
            text: chunk.text,
            token_count: chunk.token_count,
            start_token: chunk.metadata.start_token,
            end_token: chunk.metadata.end_token,
            page_number: chunk.metadata.page_number,
            metadata: chunk.metadata.to_json_map(),
        }
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read input file: {}", args.file))?;

    let config = ChunkerConfig::new(args.chunk_tokens, args.overlap)
        .map_err(|e| anyhow::anyhow!("invalid chunker configuration: {e}"))?;

    let router = SourceRouter::new(Chunker::new());
    let parser = FormFeedParser { text: raw.clone() };
    let content_type = if args.is_pdf {
        ContentType::Pdf
    } else {
        ContentType::Text
    };
    let submission = RoutableSubmission {
        content_type,
        file_path: Some(args.file.as_str()),
        original_content: Some(raw.as_str()),
    };

    let chunks = router
        .route(&submission, &parser, config)
        .await
        .map_err(|e| anyhow::anyhow!("chunking failed: {e}"))?;

    let cli_chunks: Vec<CliChunk> = chunks.into_iter().map(CliChunk::from).collect();
    let output = json!(cli_chunks);
    let pretty = serde_json::to_string_pretty(&output).context("failed to serialize chunks")?;

    std::fs::write(&args.out, pretty)
        .with_context(|| format!("failed to write output file: {}", args.out))?;

    Ok(())
}
