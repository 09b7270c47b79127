pub mod chunk;
pub mod chunking;
pub mod error;
pub mod orchestrator;
pub mod sentence_segmenter;
pub mod sink;
pub mod source_router;
pub mod token_counter;

pub use chunk::{ChunkMetadata, ChunkRecord};
pub use chunking::{Chunker, ChunkerConfig};
pub use error::ProcessingError;
pub use orchestrator::{PreprocessRequest, PreprocessResponse, PreprocessingOrchestrator};
pub use sentence_segmenter::SentenceSegmenter;
pub use sink::{ChunkSink, Submission, SubmissionStatus, SubmissionStore};
pub use source_router::{ContentType, Parser, resolve_content_type, RoutableSubmission, SourceRouter};
pub use token_counter::TokenCounter;
