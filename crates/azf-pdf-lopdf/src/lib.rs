use std::path::Path;

use lopdf::Document;

use azf_core::{BackendError, TextBackend};

/// lopdf-based implementation of [`TextBackend`].
///
/// Returns one string per page in page order. A page whose text cannot be
/// decoded comes back empty with a warning, so one broken font does not lose
/// the rest of the catalogue.
#[derive(Debug, Default)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl TextBackend for LopdfBackend {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let document = Document::load(path).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let pages = document.get_pages();
        let mut pages_text = Vec::with_capacity(pages.len());

        // get_pages() is keyed by 1-based page number, so iteration is in page order.
        for page_num in pages.keys().copied() {
            match document.extract_text(&[page_num]) {
                Ok(text) => pages_text.push(text),
                Err(e) => {
                    tracing::warn!(page = page_num, error = %e, "could not extract page text");
                    pages_text.push(String::new());
                }
            }
        }

        tracing::debug!(path = %path.display(), pages = pages_text.len(), "extracted PDF text");
        Ok(pages_text)
    }
}
