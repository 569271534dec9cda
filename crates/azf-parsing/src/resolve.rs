use std::collections::BTreeSet;

use azf_core::{Answer, Letter};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParsingConfig;
use crate::normalize::Boilerplate;

/// How answer markers were located in a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerMode {
    /// Letters at the start of a line.
    Lines,
    /// Lone capital letters inside running text.
    Inline,
    /// No answer marker found.
    None,
}

/// What the resolver recovered from one block, complete or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Prompt text before the first answer marker; empty if none.
    pub question_text: String,
    /// Answers in source order, 0 to 4 of them.
    pub answers: Vec<Answer>,
    pub letters_found: BTreeSet<Letter>,
    pub mode: MarkerMode,
}

/// A located answer marker: where its text starts and where the marker itself starts.
#[derive(Debug, Clone, Copy)]
struct Marker {
    letter: Letter,
    /// Line index (line mode) or byte offset (inline mode) of the marker.
    at: usize,
}

/// Split one question block into prompt and lettered answers.
///
/// Each accepted letter starts a new answer; following lines up to the next
/// accepted letter are appended with a single space. Letters must ascend
/// A < B < C < D; any other occurrence is plain text. Line-leading letters are
/// used when present; otherwise lone capitals inside the text are used, which
/// must start at A and run without gaps. The answer at A is marked correct.
///
/// Never fails: partial findings are returned for diagnostics.
pub fn resolve_block(block: &str) -> Resolution {
    resolve_block_with_config(block, &ParsingConfig::default())
}

/// Config-aware version of [`resolve_block`].
pub fn resolve_block_with_config(block: &str, config: &ParsingConfig) -> Resolution {
    resolve_block_with_tables(block, &Boilerplate::from_config(config))
}

pub(crate) fn resolve_block_with_tables(block: &str, tables: &Boilerplate) -> Resolution {
    let lines: Vec<&str> = block
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !tables.is_footer_line(l))
        .collect();

    let by_lines = match resolve_lines(&lines, tables) {
        Some(res) if res.answers.first().is_some_and(|a| a.letter == Letter::A) => return res,
        other => other,
    };

    // No line-leading A: the answers may run inline, e.g. "Prompt? A x B y".
    let inline = resolve_inline(&lines.join(" "), tables);
    match by_lines {
        Some(lines_res) if lines_res.answers.len() >= inline.answers.len() => lines_res,
        _ => inline,
    }
}

/// True if `text` ends like a finished prompt.
fn ends_prompt(text: &str) -> bool {
    text.trim_end()
        .chars()
        .next_back()
        .is_some_and(|c| matches!(c, '?' | ':' | '.' | '…' | ')' | '"' | '“'))
}

/// Pick the marker that starts the answers, then every later marker with a
/// higher letter. `prompt_ends` tells whether the text before a marker looks
/// like a complete prompt.
fn select_markers(
    candidates: &[Marker],
    prompt_ends: impl Fn(&Marker) -> bool,
    allow_gaps: bool,
) -> Vec<Marker> {
    let a_candidates: Vec<&Marker> = candidates
        .iter()
        .filter(|m| m.letter == Letter::A)
        .collect();
    let first = a_candidates
        .iter()
        .find(|m| prompt_ends(**m))
        .or_else(|| a_candidates.first())
        .copied()
        .or_else(|| if allow_gaps { candidates.first() } else { None });

    let Some(first) = first.copied() else {
        return Vec::new();
    };

    let mut selected = vec![first];
    let mut last = first;
    for m in candidates.iter().filter(|m| m.at > first.at) {
        let accept = if allow_gaps {
            m.letter > last.letter && m.at > last.at
        } else {
            Some(m.letter) == last.letter.next() && m.at > last.at
        };
        if accept {
            selected.push(*m);
            last = *m;
        }
    }
    selected
}

fn build_resolution(
    prompt: &str,
    spans: Vec<(Letter, String)>,
    mode: MarkerMode,
    tables: &Boilerplate,
) -> Resolution {
    let answers: Vec<Answer> = spans
        .into_iter()
        .filter_map(|(letter, raw)| {
            let text = tables.clean_answer(&raw);
            (!text.is_empty()).then_some(Answer {
                letter,
                text,
                correct: letter == Letter::A,
            })
        })
        .collect();
    Resolution {
        question_text: tables.clean_answer(prompt),
        letters_found: answers.iter().map(|a| a.letter).collect(),
        answers,
        mode,
    }
}

fn resolve_lines(lines: &[&str], tables: &Boilerplate) -> Option<Resolution> {
    static LINE_MARKER_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^([ABCD])[).:]?(?:\s+(\S.*))?$").unwrap());

    let mut candidates = Vec::new();
    let mut rests: Vec<Option<&str>> = vec![None; lines.len()];
    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = LINE_MARKER_RE.captures(line) {
            let Some(letter) = caps[1].chars().next().and_then(Letter::from_char) else {
                continue;
            };
            candidates.push(Marker { letter, at: i });
            rests[i] = Some(caps.get(2).map_or("", |m| m.as_str()));
        }
    }

    // The first line belongs to the prompt unless it is the only place an A marker occurs.
    let later_a = candidates
        .iter()
        .any(|m| m.letter == Letter::A && m.at >= 1);
    if later_a || candidates.first().is_some_and(|m| m.at == 0 && m.letter != Letter::A) {
        candidates.retain(|m| m.at >= 1);
    }

    let selected = select_markers(
        &candidates,
        |m| m.at == 0 || ends_prompt(lines[m.at - 1]),
        true,
    );
    let first = selected.first()?;

    let prompt = lines[..first.at].join(" ");
    let mut spans = Vec::with_capacity(selected.len());
    for (k, m) in selected.iter().enumerate() {
        let end = selected.get(k + 1).map_or(lines.len(), |n| n.at);
        let mut parts: Vec<&str> = Vec::new();
        if let Some(rest) = rests[m.at].filter(|r| !r.is_empty()) {
            parts.push(rest);
        }
        parts.extend_from_slice(&lines[m.at + 1..end]);
        spans.push((m.letter, parts.join(" ")));
    }

    Some(build_resolution(&prompt, spans, MarkerMode::Lines, tables))
}

/// Byte offsets of lone capitals A-D followed by answer text.
fn inline_candidates(text: &str) -> Vec<Marker> {
    let mut candidates = Vec::new();
    for (i, c) in text.char_indices() {
        let Some(letter) = Letter::from_char(c) else {
            continue;
        };
        let before_ok = text[..i].chars().next_back().is_none_or(char::is_whitespace);
        if !before_ok {
            continue;
        }
        let after = &text[i + c.len_utf8()..];
        let after = after.strip_prefix([')', '.', ':']).unwrap_or(after);
        let starts_ws = after.chars().next().is_some_and(char::is_whitespace);
        if starts_ws && !after.trim().is_empty() {
            candidates.push(Marker { letter, at: i });
        }
    }
    candidates
}

fn resolve_inline(text: &str, tables: &Boilerplate) -> Resolution {
    let candidates = inline_candidates(text);
    let selected = select_markers(
        &candidates,
        |m| m.at > 0 && ends_prompt(&text[..m.at]),
        false,
    );

    let Some(first) = selected.first() else {
        return Resolution {
            question_text: tables.clean_answer(text),
            answers: Vec::new(),
            letters_found: BTreeSet::new(),
            mode: MarkerMode::None,
        };
    };

    let prompt = &text[..first.at];
    let mut spans = Vec::with_capacity(selected.len());
    for (k, m) in selected.iter().enumerate() {
        let end = selected.get(k + 1).map_or(text.len(), |n| n.at);
        // Skip the letter and an optional ")", "." or ":".
        let body = &text[m.at + 1..end];
        let body = body.strip_prefix([')', '.', ':']).unwrap_or(body);
        spans.push((m.letter, body.to_string()));
    }

    build_resolution(prompt, spans, MarkerMode::Inline, tables)
}
