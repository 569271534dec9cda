use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config_file;

pub use backend::{BackendError, TextBackend};

/// Number of answers every exam question carries.
pub const ANSWERS_PER_QUESTION: usize = 4;

/// Raw text handed over by a document-to-text backend.
///
/// Either one string for the whole document or one string per page, in page
/// order. Page boundaries carry no meaning for segmentation; pages are joined
/// with a newline so that a new page always starts a new line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDocument {
    Text(String),
    Pages(Vec<String>),
}

impl RawDocument {
    /// The whole document as a single string.
    pub fn joined_text(&self) -> Cow<'_, str> {
        match self {
            RawDocument::Text(text) => Cow::Borrowed(text.as_str()),
            RawDocument::Pages(pages) => Cow::Owned(pages.join("\n")),
        }
    }

    /// True if the document contains nothing but whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            RawDocument::Text(text) => text.trim().is_empty(),
            RawDocument::Pages(pages) => pages.iter().all(|p| p.trim().is_empty()),
        }
    }

    pub fn page_count(&self) -> usize {
        match self {
            RawDocument::Text(_) => 1,
            RawDocument::Pages(pages) => pages.len(),
        }
    }

    /// Total length in characters.
    pub fn char_count(&self) -> usize {
        match self {
            RawDocument::Text(text) => text.chars().count(),
            RawDocument::Pages(pages) => pages.iter().map(|p| p.chars().count()).sum(),
        }
    }
}

impl From<String> for RawDocument {
    fn from(text: String) -> Self {
        RawDocument::Text(text)
    }
}

impl From<&str> for RawDocument {
    fn from(text: &str) -> Self {
        RawDocument::Text(text.to_string())
    }
}

impl From<Vec<String>> for RawDocument {
    fn from(pages: Vec<String>) -> Self {
        RawDocument::Pages(pages)
    }
}

/// Answer letter as printed in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Letter {
    A,
    B,
    C,
    D,
}

impl Letter {
    pub const ALL: [Letter; ANSWERS_PER_QUESTION] = [Letter::A, Letter::B, Letter::C, Letter::D];

    pub fn from_char(c: char) -> Option<Letter> {
        match c {
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::A => 'A',
            Letter::B => 'B',
            Letter::C => 'C',
            Letter::D => 'D',
        }
    }

    /// The letter that follows this one, if any.
    pub fn next(self) -> Option<Letter> {
        match self {
            Letter::A => Some(Letter::B),
            Letter::B => Some(Letter::C),
            Letter::C => Some(Letter::D),
            Letter::D => None,
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One lettered answer.
///
/// `letter` records where the answer stood in the source. The quiz front-end
/// reorders and relabels answers for display; `correct` travels with the
/// answer, not with its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub letter: Letter,
    pub text: String,
    pub correct: bool,
}

/// A fully extracted exam question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Official question number (1-based).
    pub id: u32,
    #[serde(rename = "question")]
    pub text: String,
    pub answers: Vec<Answer>,
}

impl Question {
    /// Checks the record invariant: non-empty prompt, exactly four answers
    /// lettered A..D once each, exactly one marked correct.
    pub fn is_well_formed(&self) -> bool {
        if self.text.trim().is_empty() || self.answers.len() != ANSWERS_PER_QUESTION {
            return false;
        }
        let letters: BTreeSet<Letter> = self.answers.iter().map(|a| a.letter).collect();
        let correct = self.answers.iter().filter(|a| a.correct).count();
        letters.len() == ANSWERS_PER_QUESTION
            && correct == 1
            && self.answers.iter().all(|a| !a.text.trim().is_empty())
    }

    /// The answer flagged correct, if exactly one is.
    pub fn correct_answer(&self) -> Option<&Answer> {
        let mut correct = self.answers.iter().filter(|a| a.correct);
        match (correct.next(), correct.next()) {
            (Some(a), None) => Some(a),
            _ => None,
        }
    }
}

/// Why a question id did not produce a [`Question`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipCause {
    NoQuestionText,
    QuestionTooShort { chars: usize },
    WrongAnswerCount { found: usize },
    WrongCorrectCount { found: usize },
    NotFound,
}

impl fmt::Display for SkipCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipCause::NoQuestionText => write!(f, "no question text"),
            SkipCause::QuestionTooShort { chars } => {
                write!(f, "question text too short ({} chars)", chars)
            }
            SkipCause::WrongAnswerCount { found } => {
                write!(f, "found {} answers instead of {}", found, ANSWERS_PER_QUESTION)
            }
            SkipCause::WrongCorrectCount { found } => {
                write!(f, "found {} correct answers instead of 1", found)
            }
            SkipCause::NotFound => write!(f, "not found in document"),
        }
    }
}

/// Diagnosis for a question id that could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRecord {
    pub id: u32,
    pub causes: Vec<SkipCause>,
    pub has_question_text: bool,
    pub answers_found: usize,
    pub letters_found: BTreeSet<Letter>,
    /// Leading excerpt of whatever prompt text was recovered.
    pub preview: String,
}

impl SkipRecord {
    /// Skip for an id that has no block anywhere in the document.
    pub fn not_found(id: u32) -> Self {
        Self {
            id,
            causes: vec![SkipCause::NotFound],
            has_question_text: false,
            answers_found: 0,
            letters_found: BTreeSet::new(),
            preview: String::new(),
        }
    }

    /// Human-readable reason, causes joined with `", "`.
    pub fn reason(&self) -> String {
        self.causes
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A block whose number lies outside `1..=expected_total`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoredBlock {
    pub id: u32,
    pub preview: String,
}

/// Outcome of one extraction run.
///
/// Every id in `1..=expected_total` is in exactly one of `accepted` or
/// `skipped`, both sorted by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub accepted: Vec<Question>,
    pub skipped: Vec<SkipRecord>,
    pub expected_total: u32,
    pub ignored: Vec<IgnoredBlock>,
}

impl ExtractionResult {
    /// Sorted ids in `1..=expected_total` without an accepted question.
    pub fn missing_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.skipped.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of expected ids not found in the document at all.
    pub fn not_found_count(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| s.causes.contains(&SkipCause::NotFound))
            .count()
    }

    /// Verifies that accepted and skipped ids partition `1..=expected_total`.
    pub fn is_complete(&self) -> bool {
        let accepted: BTreeSet<u32> = self.accepted.iter().map(|q| q.id).collect();
        let skipped: BTreeSet<u32> = self.skipped.iter().map(|s| s.id).collect();
        accepted.len() == self.accepted.len()
            && skipped.len() == self.skipped.len()
            && accepted.is_disjoint(&skipped)
            && accepted.len() + skipped.len() == self.expected_total as usize
            && accepted
                .union(&skipped)
                .all(|&id| id >= 1 && id <= self.expected_total)
    }
}
