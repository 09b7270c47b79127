use thiserror::Error;

/// Error taxonomy for the chunking pipeline.
///
/// Provider-init fallbacks (tokenizer, sentence segmenter) are never
/// represented here: a failed primary/secondary backend is demoted to a
/// `log::warn!` at the call site and the next backend in the fallback
/// hierarchy is tried instead.
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("invalid chunking configuration: {0}")]
    InvalidConfig(String),

    #[error("submission not found: {0}")]
    SubmissionNotFound(String),

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("sink failed: {0}")]
    SinkFailed(String),

    #[error("preprocessing failed: {0}")]
    PreprocessingFailed(Box<ProcessingError>),

    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ProcessingError {
    /// Wrap `self` as the cause of a `PreprocessingFailed`, unless it
    /// already is one; the orchestrator only wraps once.
    pub fn into_preprocessing_failed(self) -> Self {
        match self {
            ProcessingError::PreprocessingFailed(_) => self,
            other => ProcessingError::PreprocessingFailed(Box::new(other)),
        }
    }
}
