use std::path::Path;

use thiserror::Error;

use azf_parsing::{ExtractError, QuestionExtractor};

// Re-export domain types for convenience
pub use azf_core::{BackendError, ExtractionResult, RawDocument};

/// Page separator in plain-text exports (form feed, as written by `pdftotext`).
const PAGE_BREAK: char = '\x0c';

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("text extraction error: {0}")]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[cfg(not(feature = "pdf"))]
    #[error("PDF support not compiled in (enable the `pdf` feature of azf-ingest)")]
    NoPdfSupport,
}

/// Load a question catalogue into a [`RawDocument`].
///
/// Dispatches on file extension:
/// - `.pdf` → PDF via lopdf (requires `pdf` feature)
/// - anything else → UTF-8 text, pages separated by form feeds
pub fn load_document(path: &Path) -> Result<RawDocument, IngestError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "pdf" => load_pdf(path),
        _ => load_text(path),
    }
}

/// Load `path` and run the extraction pipeline on it.
pub fn extract_questions(
    path: &Path,
    extractor: &QuestionExtractor,
    expected_total: u32,
) -> Result<ExtractionResult, IngestError> {
    let document = load_document(path)?;
    tracing::info!(
        path = %path.display(),
        pages = document.page_count(),
        chars = document.char_count(),
        "loaded document"
    );
    Ok(extractor.extract(&document, expected_total)?)
}

fn load_text(path: &Path) -> Result<RawDocument, IngestError> {
    let text = std::fs::read_to_string(path).map_err(BackendError::from)?;
    if text.contains(PAGE_BREAK) {
        let pages = text.split(PAGE_BREAK).map(str::to_string).collect();
        Ok(RawDocument::Pages(pages))
    } else {
        Ok(RawDocument::Text(text))
    }
}

#[cfg(feature = "pdf")]
fn load_pdf(path: &Path) -> Result<RawDocument, IngestError> {
    use azf_core::TextBackend;

    let backend = azf_pdf_lopdf::LopdfBackend::default();
    Ok(RawDocument::Pages(backend.extract_pages(path)?))
}

#[cfg(not(feature = "pdf"))]
fn load_pdf(_path: &Path) -> Result<RawDocument, IngestError> {
    Err(IngestError::NoPdfSupport)
}
