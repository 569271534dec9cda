use std::path::Path;

use azf_core::{ExtractionResult, RawDocument, TextBackend};

use crate::config::ParsingConfig;
use crate::normalize::{self, Boilerplate};
use crate::record::{self, Outcome, OutcomeRecorder};
use crate::resolve::{self, Resolution};
use crate::segment::{self, QuestionBlock};
use crate::ExtractError;

/// A configurable question extraction pipeline.
///
/// Holds a [`ParsingConfig`] and exposes each pipeline step as a method.
/// The default constructor uses built-in defaults; use [`QuestionExtractor::with_config`]
/// to supply extra boilerplate patterns and thresholds.
pub struct QuestionExtractor {
    config: ParsingConfig,
    tables: Boilerplate,
}

impl Default for QuestionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self::with_config(ParsingConfig::default())
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ParsingConfig) -> Self {
        let tables = Boilerplate::from_config(&config);
        Self { config, tables }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    /// Strip page boilerplate from document text (step 1).
    pub fn normalize(&self, text: &str) -> String {
        normalize::normalize_with_tables(text, &self.tables)
    }

    /// Split normalized text into numbered question blocks (step 2).
    pub fn segment(&self, text: &str) -> Vec<QuestionBlock> {
        segment::segment_questions_with_config(text, &self.config)
    }

    /// Split one block into prompt and answers (step 3).
    pub fn resolve(&self, block: &str) -> Resolution {
        resolve::resolve_block_with_tables(block, &self.tables)
    }

    /// Validate one resolved block (step 4).
    pub fn record(&self, id: u32, resolution: Resolution) -> Outcome {
        record::record_outcome(id, resolution, &self.config)
    }

    /// Run the full pipeline on an already loaded document.
    pub fn extract(
        &self,
        document: &RawDocument,
        expected_total: u32,
    ) -> Result<ExtractionResult, ExtractError> {
        if expected_total == 0 {
            return Err(ExtractError::InvalidExpectedTotal(expected_total));
        }
        if document.is_blank() {
            return Err(ExtractError::EmptyDocument);
        }

        let text = self.normalize(&document.joined_text());
        let blocks = self.segment(&text);
        tracing::info!(
            pages = document.page_count(),
            blocks = blocks.len(),
            "segmented document"
        );

        let mut recorder = OutcomeRecorder::new(expected_total);
        for block in &blocks {
            let resolution = self.resolve(&block.text);
            recorder.record(block.id, resolution, &self.config);
        }
        let result = recorder.finish();

        tracing::info!(
            accepted = result.accepted.len(),
            skipped = result.skipped.len(),
            not_found = result.not_found_count(),
            ignored = result.ignored.len(),
            expected_total,
            "extraction finished"
        );
        Ok(result)
    }

    /// Extract page text with `backend`, then run [`QuestionExtractor::extract`].
    pub fn extract_via_backend(
        &self,
        path: &Path,
        backend: &dyn TextBackend,
        expected_total: u32,
    ) -> Result<ExtractionResult, ExtractError> {
        let pages = backend.extract_pages(path)?;
        self.extract(&RawDocument::Pages(pages), expected_total)
    }
}

#[cfg(test)]
mod tests {
    use azf_core::{BackendError, SkipCause};

    use super::*;
    use crate::ParsingConfigBuilder;

    const DOC: &str = "\
Prüfungsfragen im Prüfungsteil Kenntnisse
1 Was bedeutet die Abkürzung QNH?
A Luftdruck auf Meereshöhe reduziert
B Luftdruck am Platz
C Temperatur am Platz
D Taupunkt
2 Welche Farbe hat das linke Positionslicht?
A Rot
B Grün
C Weiß
D Blau
Stand / As at:: 01.02.2024
";

    #[test]
    fn test_extract_small_document() {
        let result = QuestionExtractor::new()
            .extract(&RawDocument::from(DOC), 2)
            .unwrap();
        assert!(result.is_complete());
        assert_eq!(result.accepted.len(), 2);
        assert_eq!(result.accepted[1].answers[0].text, "Rot");
        assert_eq!(result.accepted[1].answers[3].text, "Blau");
    }

    #[test]
    fn test_expected_total_larger_than_document() {
        let result = QuestionExtractor::new()
            .extract(&RawDocument::from(DOC), 4)
            .unwrap();
        assert!(result.is_complete());
        assert_eq!(result.missing_ids(), vec![3, 4]);
        assert!(
            result
                .skipped
                .iter()
                .all(|s| s.causes == vec![SkipCause::NotFound])
        );
    }

    #[test]
    fn test_expected_total_smaller_than_document() {
        let result = QuestionExtractor::new()
            .extract(&RawDocument::from(DOC), 1)
            .unwrap();
        assert!(result.is_complete());
        assert_eq!(result.accepted.len(), 1);
        assert_eq!(result.ignored.len(), 1);
        assert_eq!(result.ignored[0].id, 2);
    }

    #[test]
    fn test_empty_document_is_fatal() {
        let err = QuestionExtractor::new()
            .extract(&RawDocument::Pages(vec![" \n".into(), String::new()]), 5)
            .unwrap_err();
        assert!(matches!(err, ExtractError::EmptyDocument));
    }

    #[test]
    fn test_zero_expected_total_is_fatal() {
        let err = QuestionExtractor::new()
            .extract(&RawDocument::from(DOC), 0)
            .unwrap_err();
        assert!(matches!(err, ExtractError::InvalidExpectedTotal(0)));
    }

    #[test]
    fn test_boilerplate_only_document_reports_all_not_found() {
        let doc = RawDocument::from("Stand / As at:: 01.02.2024\nSeite / page 1 von / of 1\n");
        let result = QuestionExtractor::new().extract(&doc, 3).unwrap();
        assert!(result.accepted.is_empty());
        assert_eq!(result.not_found_count(), 3);
    }

    #[test]
    fn test_custom_min_question_chars() {
        let config = ParsingConfigBuilder::new()
            .min_question_chars(50)
            .build()
            .unwrap();
        let result = QuestionExtractor::with_config(config)
            .extract(&RawDocument::from(DOC), 2)
            .unwrap();
        assert!(result.accepted.is_empty());
        assert_eq!(result.skipped.len(), 2);
    }

    struct FixedBackend(Vec<String>);

    impl TextBackend for FixedBackend {
        fn extract_pages(&self, _path: &Path) -> Result<Vec<String>, BackendError> {
            Ok(self.0.clone())
        }
    }

    struct FailingBackend;

    impl TextBackend for FailingBackend {
        fn extract_pages(&self, _path: &Path) -> Result<Vec<String>, BackendError> {
            Err(BackendError::OpenError("broken".into()))
        }
    }

    #[test]
    fn test_extract_via_backend() {
        let backend = FixedBackend(vec![DOC.to_string()]);
        let result = QuestionExtractor::new()
            .extract_via_backend(Path::new("catalogue.pdf"), &backend, 2)
            .unwrap();
        assert_eq!(result.accepted.len(), 2);
    }

    #[test]
    fn test_backend_error_propagates() {
        let err = QuestionExtractor::new()
            .extract_via_backend(Path::new("catalogue.pdf"), &FailingBackend, 2)
            .unwrap_err();
        assert!(matches!(err, ExtractError::Backend(BackendError::OpenError(_))));
    }
}
