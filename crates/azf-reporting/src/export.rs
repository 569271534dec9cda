use std::path::{Path, PathBuf};

use azf_core::{ANSWERS_PER_QUESTION, ExtractionResult, Question, SkipRecord};

use crate::ExportError;

const RULE_WIDTH: usize = 70;

/// Render the accepted questions as the pretty-printed JSON question store,
/// sorted by id.
pub fn question_store_json(result: &ExtractionResult) -> Result<String, ExportError> {
    let mut questions: Vec<&Question> = result.accepted.iter().collect();
    questions.sort_by_key(|q| q.id);
    let mut json = serde_json::to_string_pretty(&questions)?;
    json.push('\n');
    Ok(json)
}

/// Compress sorted ids into runs: `[1, 2, 3, 7, 9, 10]` → `"1-3, 7, 9-10"`.
pub fn compress_ranges(ids: &[u32]) -> String {
    let mut ranges: Vec<String> = Vec::new();
    let mut iter = ids.iter().copied();
    let Some(first) = iter.next() else {
        return String::new();
    };

    let (mut start, mut end) = (first, first);
    for id in iter {
        if end.checked_add(1) == Some(id) {
            end = id;
        } else {
            ranges.push(format_range(start, end));
            start = id;
            end = id;
        }
    }
    ranges.push(format_range(start, end));
    ranges.join(", ")
}

fn format_range(start: u32, end: u32) -> String {
    if start == end {
        start.to_string()
    } else {
        format!("{}-{}", start, end)
    }
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

fn write_skip(out: &mut String, skip: &SkipRecord) {
    out.push_str(&format!("Question {}:\n", skip.id));
    out.push_str(&format!("  Reason: {}\n", skip.reason()));
    out.push_str(&format!(
        "  Has question text: {}\n",
        yes_no(skip.has_question_text)
    ));
    out.push_str(&format!(
        "  Answers found: {}/{}\n",
        skip.answers_found, ANSWERS_PER_QUESTION
    ));
    if !skip.letters_found.is_empty() {
        let letters: Vec<String> = skip.letters_found.iter().map(|l| l.to_string()).collect();
        out.push_str(&format!("  Answer letters found: {}\n", letters.join(", ")));
    }
    if !skip.preview.is_empty() {
        out.push_str(&format!("  Question preview: {}\n", skip.preview));
    }
    out.push('\n');
}

/// Render the human-readable extraction log.
///
/// Contains the summary counts, one entry per skipped id, the missing ids as
/// compressed ranges and any ignored out-of-range blocks. The output depends
/// only on `result`.
pub fn diagnostic_report(result: &ExtractionResult) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let missing = result.missing_ids();

    let mut out = String::from("AZF Question Extraction Log\n");
    out.push_str(&rule);
    out.push_str("\n\n");
    out.push_str(&format!(
        "Total questions extracted: {}\n",
        result.accepted.len()
    ));
    out.push_str(&format!("Questions skipped: {}\n", result.skipped.len()));
    out.push_str(&format!("Expected total: {}\n", result.expected_total));
    out.push_str(&format!("Missing: {}\n\n", missing.len()));

    if !result.skipped.is_empty() {
        out.push_str("Skipped Questions (Detailed):\n");
        out.push_str(&rule);
        out.push_str("\n\n");
        let mut skipped: Vec<&SkipRecord> = result.skipped.iter().collect();
        skipped.sort_by_key(|s| s.id);
        for skip in skipped {
            write_skip(&mut out, skip);
        }
    }

    if !missing.is_empty() {
        out.push_str("\nMissing Question IDs:\n");
        out.push_str(&rule);
        out.push('\n');
        out.push_str(&compress_ranges(&missing));
        out.push_str("\n\n");
        out.push_str(&format!("Total missing: {}\n\n", missing.len()));
    }

    if !result.ignored.is_empty() {
        out.push_str("\nIgnored Question IDs (outside 1..expected total):\n");
        out.push_str(&rule);
        out.push('\n');
        for block in &result.ignored {
            if block.preview.is_empty() {
                out.push_str(&format!("  {}\n", block.id));
            } else {
                out.push_str(&format!("  {}: {}\n", block.id, block.preview));
            }
        }
        out.push('\n');
    }

    if !missing.is_empty() {
        out.push_str("\nTroubleshooting Tips:\n");
        out.push_str(&"-".repeat(RULE_WIDTH));
        out.push('\n');
        out.push_str("If questions are missing:\n");
        out.push_str("1. Check the PDF for special formatting (tables, images, etc.)\n");
        out.push_str("2. Look for page breaks in the middle of questions\n");
        out.push_str("3. Verify the question has exactly 4 answers (A, B, C, D)\n");
        out.push_str("4. Check if footer text is interfering with parsing\n");
        out.push_str("5. Manually add missing questions to the question store if needed\n");
    }

    out
}

/// Render both outputs: the question store JSON and the diagnostic report.
pub fn serialize(result: &ExtractionResult) -> Result<(String, String), ExportError> {
    Ok((question_store_json(result)?, diagnostic_report(result)))
}

/// Default log path for a question store: `<dir>/<stem>_extraction_log.txt`.
pub fn log_path_for(questions_path: &Path) -> PathBuf {
    let stem = questions_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("questions");
    questions_path.with_file_name(format!("{}_extraction_log.txt", stem))
}

fn write_file(path: &Path, content: &str) -> Result<(), ExportError> {
    std::fs::write(path, content).map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the question store and the diagnostic report to their files.
pub fn write_outputs(
    result: &ExtractionResult,
    questions_path: &Path,
    log_path: &Path,
) -> Result<(), ExportError> {
    let (store, report) = serialize(result)?;
    write_file(questions_path, &store)?;
    tracing::info!(path = %questions_path.display(), questions = result.accepted.len(), "wrote question store");
    write_file(log_path, &report)?;
    tracing::info!(path = %log_path.display(), "wrote extraction log");
    Ok(())
}
