use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParsingConfig;

/// Tokens that make a line-leading number a measurement rather than a
/// question number ("121 MHz", "1000 ft").
pub(crate) static UNIT_TOKENS: &[&str] = &[
    "ft", "m", "km", "NM", "SM", "kt", "kts", "Hz", "kHz", "MHz", "GHz", "W", "mW", "kW", "V",
    "mV", "hPa", "mbar", "%", "°", "Grad", "Meter", "Fuß", "Fuss", "Knoten", "Watt", "Volt",
    "Kanäle", "Kanal", "Prozent", "Stunden", "Minuten", "Sekunden", "Uhr", "UTC",
];

/// The text belonging to one question, from its number up to the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBlock {
    /// Question number as printed.
    pub id: u32,
    /// Block text starting right after the number.
    pub text: String,
    /// Byte offset of the marker line in the normalized text.
    pub offset: usize,
}

/// A line-leading number that could start a question.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    id: u32,
    line_start: usize,
    body_start: usize,
}

/// Split normalized text into per-question blocks, in document order.
///
/// A block starts at a question number at the beginning of a line, followed
/// by prompt-like text (an uppercase word that is not a unit) on the same line
/// or on the next one. Numbers have to ascend through the document, so the
/// longest ascending chain of candidates is kept; a candidate that would break
/// the chain is ordinary text of the block it sits in.
///
/// Between equally long chains, the one whose markers sit in more plausible
/// places wins: outside an answer list that has started at A but not reached
/// D, and followed by an answer list starting at A. Remaining ties go to the
/// earlier candidate. Text before the first marker is dropped.
pub fn segment_questions(text: &str) -> Vec<QuestionBlock> {
    segment_questions_with_config(text, &ParsingConfig::default())
}

/// Config-aware version of [`segment_questions`].
pub fn segment_questions_with_config(
    text: &str,
    config: &ParsingConfig,
) -> Vec<QuestionBlock> {
    let candidates = find_candidates(text, config);
    let scores = plausibility(text, &candidates);
    let chain = longest_ascending_chain(&candidates, &scores);

    if chain.len() < candidates.len() {
        tracing::debug!(
            candidates = candidates.len(),
            kept = chain.len(),
            "discarded question markers"
        );
    }

    let mut blocks = Vec::with_capacity(chain.len());
    for (pos, &ci) in chain.iter().enumerate() {
        let cand = candidates[ci];
        let end = chain
            .get(pos + 1)
            .map(|&next| candidates[next].line_start)
            .unwrap_or(text.len());
        blocks.push(QuestionBlock {
            id: cand.id,
            text: text[cand.body_start..end].trim_end().to_string(),
            offset: cand.line_start,
        });
    }
    blocks
}

fn find_candidates(text: &str, config: &ParsingConfig) -> Vec<Candidate> {
    // The prompt may follow on the next line when the number sits in its own table cell.
    static MARKER_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?m)^[ \t]*(\d{1,4})(?:[ \t]+|[ \t]*\n[ \t]*)(\S+)").unwrap()
    });

    let re = config.question_marker_re.as_ref().unwrap_or(&MARKER_RE);
    let defaults: Vec<String> = UNIT_TOKENS.iter().map(|s| s.to_string()).collect();
    let units = config.unit_tokens.resolve(&defaults);

    let mut candidates = Vec::new();
    let mut pos = 0;
    while pos <= text.len() {
        let Some(caps) = re.captures_at(text, pos) else {
            break;
        };
        let (Some(whole), Some(num)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        // Resume on the line after the number so a marker on the next line is not consumed.
        pos = text[num.end()..]
            .find('\n')
            .map_or(text.len() + 1, |p| num.end() + p + 1);

        let Ok(id) = num.as_str().parse::<u32>() else {
            continue;
        };
        if id == 0 {
            continue;
        }
        let body_start = match caps.get(2) {
            Some(token) => {
                if !is_prompt_start(token.as_str(), &units) {
                    continue;
                }
                // A bare number above an answer line is a page or table number.
                let on_next_line = text
                    .get(num.end()..token.start())
                    .is_some_and(|gap| gap.contains('\n'));
                if on_next_line && is_answer_letter(token.as_str()) {
                    continue;
                }
                token.start()
            }
            None => whole.end(),
        };
        candidates.push(Candidate {
            id,
            line_start: whole.start(),
            body_start,
        });
    }
    candidates
}

/// True if `token` can open a question prompt.
fn is_prompt_start(token: &str, units: &[String]) -> bool {
    let bare = token.trim_end_matches(['.', ',', ';', ':', ')']);
    if units.iter().any(|u| u.eq_ignore_ascii_case(bare)) {
        return false;
    }
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_uppercase() => true,
        Some('"' | '\'' | '(' | '„' | '“' | '»' | '‚') => {
            chars.next().is_some_and(|c| c.is_uppercase())
        }
        _ => false,
    }
}

fn is_answer_letter(token: &str) -> bool {
    matches!(
        token.trim_end_matches([')', '.', ':']),
        "A" | "B" | "C" | "D"
    )
}

/// Start offsets and letters of lines that begin with an answer marker.
fn answer_lines(text: &str) -> Vec<(usize, char)> {
    static ANSWER_LINE_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?m)^[ \t]*([ABCD])(?:[).:]?[ \t]+\S|[).:]?[ \t]*$)").unwrap()
    });

    ANSWER_LINE_RE
        .captures_iter(text)
        .filter_map(|caps| Some((caps.get(0)?.start(), caps[1].chars().next()?)))
        .collect()
}

/// Score each candidate 0..=2: one point if it does not interrupt an answer
/// list that has reached A but not D, one point if the first answer line
/// after its prompt line is A.
fn plausibility(text: &str, candidates: &[Candidate]) -> Vec<u32> {
    let answers = answer_lines(text);
    let mut scores = Vec::with_capacity(candidates.len());
    let mut open = false;
    let mut k = 0;

    for (i, cand) in candidates.iter().enumerate() {
        while let Some(&(pos, letter)) = answers.get(k) {
            if pos >= cand.line_start {
                break;
            }
            match letter {
                'A' => open = true,
                'D' => open = false,
                _ => {}
            }
            k += 1;
        }

        let prompt_line_end = text[cand.body_start..]
            .find('\n')
            .map_or(text.len(), |p| cand.body_start + p);
        let window_end = candidates
            .get(i + 1)
            .map_or(text.len(), |next| next.line_start);
        let leads_to_a = answers[k..]
            .iter()
            .find(|(pos, _)| *pos >= prompt_line_end)
            .is_some_and(|&(pos, letter)| pos < window_end && letter == 'A');

        scores.push(u32::from(!open) + u32::from(leads_to_a));
    }
    scores
}

/// Indices of the longest chain of candidates with strictly ascending ids.
/// Equally long chains are ranked by total plausibility, then by position.
fn longest_ascending_chain(candidates: &[Candidate], scores: &[u32]) -> Vec<usize> {
    let n = candidates.len();
    // (chain length, plausibility sum) of the best chain ending at i.
    let mut key: Vec<(usize, u32)> = (0..n).map(|i| (1, scores[i])).collect();
    let mut prev: Vec<Option<usize>> = vec![None; n];

    for i in 0..n {
        for j in 0..i {
            let extended = (key[j].0 + 1, key[j].1 + scores[i]);
            if candidates[j].id < candidates[i].id && extended > key[i] {
                key[i] = extended;
                prev[i] = Some(j);
            }
        }
    }

    let mut best: Option<usize> = None;
    for i in 0..n {
        if best.is_none_or(|b| key[i] > key[b]) {
            best = Some(i);
        }
    }

    let mut chain = Vec::new();
    let mut cursor = best;
    while let Some(i) = cursor {
        chain.push(i);
        cursor = prev[i];
    }
    chain.reverse();
    chain
}
