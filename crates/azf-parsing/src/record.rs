use std::collections::BTreeMap;

use azf_core::{
    ANSWERS_PER_QUESTION, ExtractionResult, IgnoredBlock, Question, SkipCause, SkipRecord,
};

use crate::config::ParsingConfig;
use crate::resolve::Resolution;
use crate::text_processing::truncate_chars;

/// Result of validating one resolved block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(Question),
    Skipped(SkipRecord),
}

impl Outcome {
    pub fn id(&self) -> u32 {
        match self {
            Outcome::Accepted(q) => q.id,
            Outcome::Skipped(s) => s.id,
        }
    }
}

/// Validate a resolution and turn it into an accepted question or a skip record.
///
/// All failing checks are reported, not just the first.
pub fn record_outcome(id: u32, resolution: Resolution, config: &ParsingConfig) -> Outcome {
    let prompt = resolution.question_text.trim();
    let prompt_chars = prompt.chars().count();
    let correct = resolution.answers.iter().filter(|a| a.correct).count();

    let mut causes = Vec::new();
    if prompt.is_empty() {
        causes.push(SkipCause::NoQuestionText);
    } else if prompt_chars <= config.min_question_chars() {
        causes.push(SkipCause::QuestionTooShort {
            chars: prompt_chars,
        });
    }
    if resolution.answers.len() != ANSWERS_PER_QUESTION {
        causes.push(SkipCause::WrongAnswerCount {
            found: resolution.answers.len(),
        });
    }
    if correct != 1 {
        causes.push(SkipCause::WrongCorrectCount { found: correct });
    }

    if causes.is_empty() {
        tracing::debug!(id, "question accepted");
        return Outcome::Accepted(Question {
            id,
            text: prompt.to_string(),
            answers: resolution.answers,
        });
    }

    let record = SkipRecord {
        id,
        causes,
        has_question_text: !prompt.is_empty(),
        answers_found: resolution.answers.len(),
        letters_found: resolution.letters_found,
        preview: truncate_chars(prompt, config.preview_chars()),
    };
    tracing::warn!(id, reason = %record.reason(), "question skipped");
    Outcome::Skipped(record)
}

/// Collects outcomes for ids `1..=expected_total` and fills in the gaps.
#[derive(Debug)]
pub struct OutcomeRecorder {
    expected_total: u32,
    outcomes: BTreeMap<u32, Outcome>,
    ignored: Vec<IgnoredBlock>,
}

impl OutcomeRecorder {
    pub fn new(expected_total: u32) -> Self {
        Self {
            expected_total,
            outcomes: BTreeMap::new(),
            ignored: Vec::new(),
        }
    }

    /// Record one block's resolution. Ids outside the expected range go to
    /// `ignored`; a repeated id keeps its first outcome.
    pub fn record(&mut self, id: u32, resolution: Resolution, config: &ParsingConfig) {
        if id == 0 || id > self.expected_total {
            tracing::warn!(
                id,
                expected_total = self.expected_total,
                "question number outside expected range, ignoring"
            );
            self.ignored.push(IgnoredBlock {
                id,
                preview: truncate_chars(resolution.question_text.trim(), config.preview_chars()),
            });
            return;
        }
        if self.outcomes.contains_key(&id) {
            tracing::warn!(id, "duplicate question number, keeping the first block");
            return;
        }
        let outcome = record_outcome(id, resolution, config);
        self.outcomes.insert(id, outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Add a not-found record for every id never seen and build the result.
    pub fn finish(self) -> ExtractionResult {
        let mut accepted = Vec::new();
        let mut skipped = Vec::new();
        let mut outcomes = self.outcomes;

        for id in 1..=self.expected_total {
            match outcomes.remove(&id) {
                Some(Outcome::Accepted(q)) => accepted.push(q),
                Some(Outcome::Skipped(s)) => skipped.push(s),
                None => {
                    tracing::warn!(id, "question not found in document");
                    skipped.push(SkipRecord::not_found(id));
                }
            }
        }

        let mut ignored = self.ignored;
        ignored.sort_by_key(|b| b.id);

        ExtractionResult {
            accepted,
            skipped,
            expected_total: self.expected_total,
            ignored,
        }
    }
}
