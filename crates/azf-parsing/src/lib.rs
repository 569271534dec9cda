use std::path::Path;

use thiserror::Error;

pub mod config;
pub mod extractor;
pub mod normalize;
pub mod record;
pub mod resolve;
pub mod segment;
pub mod text_processing;

pub use config::{ListOverride, ParsingConfig, ParsingConfigBuilder};
pub use extractor::QuestionExtractor;
pub use record::{Outcome, OutcomeRecorder, record_outcome};
pub use resolve::{MarkerMode, Resolution, resolve_block};
pub use segment::{QuestionBlock, segment_questions};
// Re-export domain types from core (canonical definitions live there)
pub use azf_core::{
    Answer, BackendError, ExtractionResult, IgnoredBlock, Letter, Question, RawDocument,
    SkipCause, SkipRecord, TextBackend,
};

/// Conditions that stop a run before any per-question result exists.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("document contains no text")]
    EmptyDocument,
    #[error("expected question count must be at least 1, got {0}")]
    InvalidExpectedTotal(u32),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Extract exam questions from a document using the given backend for text extraction.
///
/// Pipeline:
/// 1. Extract page text via `backend` and join the pages
/// 2. Strip recurring page boilerplate
/// 3. Split the text into numbered question blocks
/// 4. Split each block into prompt and answers A-D
/// 5. Accept complete questions, record a diagnosis for every other id
pub fn extract_questions(
    path: &Path,
    backend: &dyn TextBackend,
    expected_total: u32,
) -> Result<ExtractionResult, ExtractError> {
    QuestionExtractor::new().extract_via_backend(path, backend, expected_total)
}
