use crate::chunking::{Chunker, ChunkerConfig};
use crate::error::ProcessingError;
use crate::sink::{ChunkSink, Submission, SubmissionStatus, SubmissionStore};
use crate::source_router::{resolve_content_type, Parser, RoutableSubmission, SourceRouter};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHUNK_TOKENS: usize = 900;
pub const DEFAULT_OVERLAP_TOKENS: usize = 200;
const CHUNK_TOKENS_RANGE: std::ops::RangeInclusive<usize> = 500..=2000;
const OVERLAP_TOKENS_RANGE: std::ops::RangeInclusive<usize> = 0..=500;

/// Wire-compatible request shape. Accepts the current `chunk_tokens`/
/// `overlap_tokens` parameters or the legacy character-based `chunk_size`/
/// `overlap` names; legacy fields are logged as deprecated and otherwise
/// ignored. Any field that is neither current nor legacy is rejected
/// rather than silently dropped, which is the one place we deliberately
/// diverge from the source system's actual behavior.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreprocessRequest {
    pub submission_id: String,
    #[serde(default)]
    pub chunk_tokens: Option<usize>,
    #[serde(default)]
    pub overlap_tokens: Option<usize>,
    #[serde(default)]
    pub chunk_size: Option<usize>,
    #[serde(default)]
    pub overlap: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreprocessResponse {
    pub success: bool,
    pub submission_id: String,
    pub chunks_created: usize,
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Drives a submission through status transitions, invoking `SourceRouter`
/// and persisting chunks via `ChunkSink`. Owns the submission lifecycle; it
/// is the only thing that mutates submission status for a given id.
pub struct PreprocessingOrchestrator<P, S, K>
where
    P: Parser,
    S: SubmissionStore,
    K: ChunkSink,
{
    parser: P,
    store: S,
    sink: K,
    router: SourceRouter,
}

impl<P, S, K> PreprocessingOrchestrator<P, S, K>
where
    P: Parser,
    S: SubmissionStore,
    K: ChunkSink,
{
    pub fn new(parser: P, store: S, sink: K) -> Self {
        Self {
            parser,
            store,
            sink,
            router: SourceRouter::new(Chunker::new()),
        }
    }

    /// Resolve a raw request into a validated `(chunk_tokens, overlap_tokens)`
    /// pair, enforcing the hard bounds and logging legacy-field usage.
    fn resolve_config(&self, request: &PreprocessRequest) -> Result<ChunkerConfig, ProcessingError> {
        if request.chunk_size.is_some() || request.overlap.is_some() {
            warn!(
                "submission {} used deprecated chunk_size/overlap fields; they are ignored",
                request.submission_id
            );
        }

        let chunk_tokens = request.chunk_tokens.unwrap_or(DEFAULT_CHUNK_TOKENS);
        let overlap_tokens = request.overlap_tokens.unwrap_or(DEFAULT_OVERLAP_TOKENS);

        if !CHUNK_TOKENS_RANGE.contains(&chunk_tokens) {
            return Err(ProcessingError::InvalidConfig(format!(
                "chunk_tokens ({chunk_tokens}) must be within {CHUNK_TOKENS_RANGE:?}"
            )));
        }
        if !OVERLAP_TOKENS_RANGE.contains(&overlap_tokens) {
            return Err(ProcessingError::InvalidConfig(format!(
                "overlap_tokens ({overlap_tokens}) must be within {OVERLAP_TOKENS_RANGE:?}"
            )));
        }

        ChunkerConfig::new(chunk_tokens, overlap_tokens)
    }

    pub async fn preprocess(
        &self,
        request: PreprocessRequest,
    ) -> Result<PreprocessResponse, ProcessingError> {
        let submission = self
            .store
            .get(&request.submission_id)
            .await
            .ok_or_else(|| ProcessingError::SubmissionNotFound(request.submission_id.clone()))?;

        if submission.status == SubmissionStatus::Preprocessed {
            let count = self.sink.get_count(&submission.id).await?;
            info!(
                "submission {} already preprocessed, short-circuiting with {} chunks",
                submission.id, count
            );
            return Ok(PreprocessResponse {
                success: true,
                submission_id: submission.id,
                chunks_created: count,
                status: SubmissionStatus::Preprocessed,
                message: None,
            });
        }

        let config = self.resolve_config(&request)?;

        self.store
            .set_status(&submission.id, SubmissionStatus::Preprocessing)
            .await;

        match self.run_pipeline(&submission, config).await {
            Ok(chunk_count) => {
                self.store
                    .set_status(&submission.id, SubmissionStatus::Preprocessed)
                    .await;
                Ok(PreprocessResponse {
                    success: true,
                    submission_id: submission.id,
                    chunks_created: chunk_count,
                    status: SubmissionStatus::Preprocessed,
                    message: None,
                })
            }
            Err(cause) => {
                error!("preprocessing failed for {}: {}", submission.id, cause);
                self.store
                    .set_status(&submission.id, SubmissionStatus::Failed)
                    .await;
                self.sink.delete_by_submission(&submission.id).await.ok();
                Err(cause.into_preprocessing_failed())
            }
        }
    }

    async fn run_pipeline(
        &self,
        submission: &Submission,
        config: ChunkerConfig,
    ) -> Result<usize, ProcessingError> {
        let content_type = resolve_content_type(&submission.content_type)?;
        let routable = RoutableSubmission {
            content_type,
            file_path: submission.file_path.as_deref(),
            original_content: submission.original_content.as_deref(),
        };
        let chunks = self
            .router
            .route(&routable, &self.parser, config)
            .await?;

        for chunk in &chunks {
            self.sink
                .insert(
                    &submission.id,
                    chunk.chunk_index,
                    &chunk.text,
                    chunk.token_count,
                    &chunk.metadata.to_json_map(),
                )
                .await?;
        }

        Ok(chunks.len())
    }

    /// Remove all chunks for `submission_id` and reset status to `uploaded`.
    ///
    /// Defensive by design: an unresolvable id deletes zero chunks and
    /// returns 0 rather than failing, matching the external store's own
    /// `delete_chunks` behavior, which never raises on a missing
    /// submission. Status is only reset when the submission actually
    /// exists.
    pub async fn delete_chunks(&self, submission_id: &str) -> Result<usize, ProcessingError> {
        let removed = self.sink.delete_by_submission(submission_id).await?;

        if let Some(submission) = self.store.get(submission_id).await {
            self.store
                .set_status(&submission.id, SubmissionStatus::Uploaded)
                .await;
        }

        Ok(removed)
    }
}
