use std::io::Write;
use std::path::Path;

use azf_core::ExtractionResult;
use azf_parsing::text_processing::truncate_chars;
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the extraction counts.
pub fn print_summary(
    w: &mut dyn Write,
    file_name: &str,
    result: &ExtractionResult,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "Extracting questions from {}...", file_name)?;
    let line = format!(
        "Extracted {} of {} questions",
        result.accepted.len(),
        result.expected_total
    );
    if color.enabled() {
        if result.skipped.is_empty() {
            writeln!(w, "{}", line.green())?;
        } else {
            writeln!(w, "{}", line.bold())?;
        }
    } else {
        writeln!(w, "{}", line)?;
    }

    if !result.skipped.is_empty() {
        let detail = format!(
            "({} skipped, {} not found in document)",
            result.skipped.len(),
            result.not_found_count()
        );
        if color.enabled() {
            writeln!(w, "{}", detail.dimmed())?;
        } else {
            writeln!(w, "{}", detail)?;
        }
    }
    if !result.ignored.is_empty() {
        writeln!(
            w,
            "({} blocks numbered outside 1..{} ignored)",
            result.ignored.len(),
            result.expected_total
        )?;
    }
    writeln!(w)?;
    Ok(())
}

/// Print where the question store and the log were written.
pub fn print_outputs(
    w: &mut dyn Write,
    questions_path: &Path,
    log_path: &Path,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "Saved to: {}", questions_path.display().bold())?;
    } else {
        writeln!(w, "Saved to: {}", questions_path.display())?;
    }
    writeln!(w, "Extraction log saved to: {}", log_path.display())?;
    writeln!(w)?;
    Ok(())
}

/// Print the first accepted question as a sample.
pub fn print_sample(
    w: &mut dyn Write,
    result: &ExtractionResult,
    color: ColorMode,
) -> std::io::Result<()> {
    let Some(sample) = result.accepted.first() else {
        return Ok(());
    };
    let rule = "-".repeat(50);

    writeln!(w, "Sample question:")?;
    writeln!(w, "{}", rule)?;
    writeln!(w, "ID: {}", sample.id)?;
    writeln!(w, "Q:  {}...", truncate_chars(&sample.text, 100))?;
    if let Some(answer) = sample.correct_answer() {
        let text = truncate_chars(&answer.text, 60);
        if color.enabled() {
            writeln!(w, "{}:  {}... {}", answer.letter, text, "[correct]".green())?;
        } else {
            writeln!(w, "{}:  {}... [correct]", answer.letter, text)?;
        }
    }
    writeln!(w, "{}", rule)?;
    writeln!(w)?;
    Ok(())
}

/// Point the user at the log when anything was skipped.
pub fn print_skip_warning(
    w: &mut dyn Write,
    result: &ExtractionResult,
    log_path: &Path,
    color: ColorMode,
) -> std::io::Result<()> {
    if result.skipped.is_empty() {
        return Ok(());
    }
    let msg = format!(
        "{} question(s) were skipped during extraction",
        result.skipped.len()
    );
    if color.enabled() {
        writeln!(w, "{} {}", "WARNING:".yellow(), msg)?;
    } else {
        writeln!(w, "WARNING: {}", msg)?;
    }
    writeln!(w, "   Check {} for details", log_path.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use azf_core::{Answer, Letter, Question, SkipRecord};

    use super::*;

    fn result() -> ExtractionResult {
        ExtractionResult {
            accepted: vec![Question {
                id: 1,
                text: "Welche Farbe hat das linke Positionslicht eines Luftfahrzeugs?".into(),
                answers: Letter::ALL
                    .iter()
                    .map(|&letter| Answer {
                        letter,
                        text: if letter == Letter::A { "Rot".into() } else { "Grün".into() },
                        correct: letter == Letter::A,
                    })
                    .collect(),
            }],
            skipped: vec![SkipRecord::not_found(2)],
            expected_total: 2,
            ignored: vec![],
        }
    }

    fn render(f: impl FnOnce(&mut dyn Write) -> std::io::Result<()>) -> String {
        let mut buf: Vec<u8> = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_summary_plain() {
        let out = render(|w| print_summary(w, "fragen.pdf", &result(), ColorMode(false)));
        assert!(out.contains("Extracting questions from fragen.pdf..."));
        assert!(out.contains("Extracted 1 of 2 questions"));
        assert!(out.contains("(1 skipped, 1 not found in document)"));
        assert!(!out.contains('\x1b'));
    }

    #[test]
    fn test_sample_marks_correct_answer() {
        let out = render(|w| print_sample(w, &result(), ColorMode(false)));
        assert!(out.contains("ID: 1\n"));
        assert!(out.contains("A:  Rot... [correct]\n"));
    }

    #[test]
    fn test_sample_truncates_prompt() {
        let mut r = result();
        r.accepted[0].text = "ä".repeat(150);
        let out = render(|w| print_sample(w, &r, ColorMode(false)));
        assert!(out.contains(&format!("Q:  {}...", "ä".repeat(100))));
    }

    #[test]
    fn test_no_sample_without_questions() {
        let mut r = result();
        r.accepted.clear();
        let out = render(|w| print_sample(w, &r, ColorMode(false)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_skip_warning() {
        let out = render(|w| {
            print_skip_warning(w, &result(), Path::new("q_extraction_log.txt"), ColorMode(false))
        });
        assert!(out.contains("WARNING: 1 question(s) were skipped during extraction"));
        assert!(out.contains("Check q_extraction_log.txt for details"));
    }

    #[test]
    fn test_colored_output_has_escapes() {
        let out = render(|w| print_sample(w, &result(), ColorMode(true)));
        assert!(out.contains('\x1b'));
    }
}
