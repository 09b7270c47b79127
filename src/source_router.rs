use crate::chunk::ChunkRecord;
use crate::chunking::{Chunker, ChunkerConfig};
use crate::error::ProcessingError;
use async_trait::async_trait;
use log::{debug, warn};

/// Content type recorded on a submission, used to pick an extraction path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Pdf,
    Docx,
    Html,
    Markdown,
    Text,
}

impl ContentType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "html" => Some(Self::Html),
            "markdown" => Some(Self::Markdown),
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

/// External document extraction boundary: PDF page splitting and DOCX text
/// extraction are both out of scope for the core and live behind this
/// trait so `SourceRouter` never touches document bytes directly.
#[async_trait]
pub trait Parser: Send + Sync {
    async fn extract_pdf_pages(&self, path: &str) -> Result<Vec<String>, ProcessingError>;
    async fn parse_docx(&self, path: &str) -> Result<String, ProcessingError>;
}

/// Everything the router needs to know about a submission to dispatch it.
pub struct RoutableSubmission<'a> {
    pub content_type: ContentType,
    pub file_path: Option<&'a str>,
    pub original_content: Option<&'a str>,
}

/// Dispatches a submission to the right extraction path by content type and
/// feeds the extracted text through the [`Chunker`].
///
/// PDF submissions are chunked per page, skipping whitespace-only pages,
/// and then re-indexed into one dense, globally monotonic sequence; every
/// other content type is a single chunking call with `page_number = None`.
pub struct SourceRouter {
    chunker: Chunker,
}

impl SourceRouter {
    pub fn new(chunker: Chunker) -> Self {
        Self { chunker }
    }

    pub async fn route(
        &self,
        submission: &RoutableSubmission<'_>,
        parser: &dyn Parser,
        config: ChunkerConfig,
    ) -> Result<Vec<ChunkRecord>, ProcessingError> {
        match submission.content_type {
            ContentType::Pdf => {
                let path = submission.file_path.ok_or_else(|| {
                    ProcessingError::ExtractionFailed("pdf submission has no file_path".into())
                })?;
                let pages = parser.extract_pdf_pages(path).await?;
                self.chunk_pages(&pages, config)
            }
            ContentType::Docx => {
                let path = submission.file_path.ok_or_else(|| {
                    ProcessingError::ExtractionFailed("docx submission has no file_path".into())
                })?;
                let text = parser.parse_docx(path).await?;
                self.chunker.chunk(&text, config, None)
            }
            ContentType::Html | ContentType::Markdown | ContentType::Text => {
                let text = submission.original_content.ok_or_else(|| {
                    ProcessingError::ExtractionFailed(
                        "submission has no stored content".into(),
                    )
                })?;
                self.chunker.chunk(text, config, None)
            }
        }
    }

    /// Chunk each non-empty page independently, then flatten and re-index
    /// the whole sequence so `chunk_index` stays dense and monotonic across
    /// the submission even though each page's `start_token`/`end_token`
    /// are local to that page.
    fn chunk_pages(
        &self,
        pages: &[String],
        config: ChunkerConfig,
    ) -> Result<Vec<ChunkRecord>, ProcessingError> {
        let mut all_chunks = Vec::new();

        for (zero_based, page_text) in pages.iter().enumerate() {
            let page_number = zero_based + 1;
            if page_text.trim().is_empty() {
                debug!("skipping whitespace-only page {page_number}");
                continue;
            }
            let page_chunks = self.chunker.chunk(page_text, config, Some(page_number))?;
            all_chunks.extend(page_chunks);
        }

        for (index, chunk) in all_chunks.iter_mut().enumerate() {
            chunk.chunk_index = index;
        }

        Ok(all_chunks)
    }
}

/// Dispatches an unrecognized content-type string before a [`SourceRouter`]
/// is ever reached; kept separate so callers that only have the raw string
/// can fail fast with `UnsupportedContentType`.
pub fn resolve_content_type(raw: &str) -> Result<ContentType, ProcessingError> {
    ContentType::parse(raw).ok_or_else(|| {
        warn!("unsupported content type: {raw}");
        ProcessingError::UnsupportedContentType(raw.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubParser {
        pages: Vec<String>,
        docx_text: String,
    }

    #[async_trait]
    impl Parser for StubParser {
        async fn extract_pdf_pages(&self, _path: &str) -> Result<Vec<String>, ProcessingError> {
            Ok(self.pages.clone())
        }

        async fn parse_docx(&self, _path: &str) -> Result<String, ProcessingError> {
            Ok(self.docx_text.clone())
        }
    }

    fn router() -> SourceRouter {
        SourceRouter::new(Chunker::new())
    }

    #[test]
    fn resolves_known_content_types() {
        assert_eq!(resolve_content_type("pdf").unwrap(), ContentType::Pdf);
        assert_eq!(resolve_content_type("text").unwrap(), ContentType::Text);
        assert!(resolve_content_type("exe").is_err());
    }

    #[tokio::test]
    async fn pdf_paging_skips_blank_pages_and_reindexes() {
        let parser = StubParser {
            pages: vec![
                "Page one. ".repeat(50),
                String::new(),
                "Page three. ".repeat(50),
            ],
            docx_text: String::new(),
        };
        let submission = RoutableSubmission {
            content_type: ContentType::Pdf,
            file_path: Some("doc.pdf"),
            original_content: None,
        };
        let config = ChunkerConfig::new(200, 0).unwrap();
        let chunks = router()
            .route(&submission, &parser, config)
            .await
            .unwrap();

        assert!(!chunks.is_empty());
        let pages: std::collections::HashSet<_> =
            chunks.iter().map(|c| c.metadata.page_number).collect();
        assert!(pages.contains(&Some(1)));
        assert!(pages.contains(&Some(3)));
        assert!(!pages.contains(&Some(2)));

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i);
        }
    }

    #[tokio::test]
    async fn docx_is_chunked_as_a_single_unpaginated_call() {
        let parser = StubParser {
            pages: vec![],
            docx_text: "One sentence. Another sentence.".to_string(),
        };
        let submission = RoutableSubmission {
            content_type: ContentType::Docx,
            file_path: Some("doc.docx"),
            original_content: None,
        };
        let config = ChunkerConfig::new(100, 10).unwrap();
        let chunks = router()
            .route(&submission, &parser, config)
            .await
            .unwrap();
        assert!(chunks.iter().all(|c| c.metadata.page_number.is_none()));
    }

    #[tokio::test]
    async fn text_content_uses_stored_original_content() {
        let parser = StubParser {
            pages: vec![],
            docx_text: String::new(),
        };
        let submission = RoutableSubmission {
            content_type: ContentType::Text,
            file_path: None,
            original_content: Some("Plain text. Nothing fancy."),
        };
        let config = ChunkerConfig::new(100, 10).unwrap();
        let chunks = router()
            .route(&submission, &parser, config)
            .await
            .unwrap();
        assert_eq!(chunks.len(), 1);
    }
}
