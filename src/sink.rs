use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lifecycle state of a submission, mutated only by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Uploaded,
    Preprocessing,
    Preprocessed,
    Failed,
}

/// The externally-owned document record the orchestrator preprocesses.
///
/// `content_type` is the raw string the store hands back (`"pdf"`,
/// `"docx"`, `"html"`, ...); it is only resolved into a typed
/// [`crate::source_router::ContentType`] by the router, so an
/// unrecognized value reaches `UnsupportedContentType` through the real
/// pipeline rather than being rejected earlier by construction.
#[derive(Debug, Clone)]
pub struct Submission {
    pub id: String,
    pub content_type: String,
    pub file_path: Option<String>,
    pub original_content: Option<String>,
    pub status: SubmissionStatus,
}

/// Durable chunk storage, consumed by the orchestrator. Implementations
/// must make `insert` durable no later than the subsequent status commit,
/// and must support rolling back a partial batch on failure.
#[async_trait]
pub trait ChunkSink: Send + Sync {
    async fn insert(
        &self,
        submission_id: &str,
        chunk_index: usize,
        text: &str,
        token_count: usize,
        metadata: &Map<String, Value>,
    ) -> Result<(), crate::error::ProcessingError>;

    async fn delete_by_submission(
        &self,
        submission_id: &str,
    ) -> Result<usize, crate::error::ProcessingError>;

    async fn get_count(
        &self,
        submission_id: &str,
    ) -> Result<usize, crate::error::ProcessingError>;
}

/// Submission lookup and status mutation, external to the core.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn get(&self, id: &str) -> Option<Submission>;
    async fn set_status(&self, id: &str, status: SubmissionStatus);
}
