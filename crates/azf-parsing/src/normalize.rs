use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{ListOverride, ParsingConfig};
use crate::text_processing::{collapse_whitespace, expand_ligatures, unify_whitespace};

/// Recurring page decoration of the AZF catalogue. Text reflow can move these
/// into the middle of a line, so they are matched anywhere, not just at page edges.
pub(crate) static BOILERPLATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Footer date line: "Stand / As at:: 01.02.2024"
        r"(?i)Stand\s*/\s*As\s+at::[^\n]*",
        // Footer notice about the answer convention
        r"(?i)richtige\s+Antwort\s+immer\s+A\s*/[^\n]*",
        r"(?i)correct\s+answer\s+always\s+A\b[^\n]*",
        // Page counter: "Seite / page 3 von / of 40"
        r"(?i)Seite\s*/\s*page\s*\d+\s*von\s*/\s*of\s*\d+",
        // Running header naming the exam section
        r"(?i)Prüfungsfragen\s+im\s+Prüfungsteil[^\n]*",
        // Bare "3 / 40" counters on their own line
        r"(?m)^[ \t]*\d{1,4}[ \t]*/[ \t]*\d{1,4}[ \t]*$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Leading phrases of footer lines. A line starting with one of these is page
/// decoration; an answer containing one is cut there.
pub(crate) static FOOTER_PREFIXES: &[&str] = &[
    "Stand / As at::",
    "richtige Antwort immer A",
    "correct answer always A",
    "Seite / page",
    "Prüfungsfragen im Prüfungsteil",
];

static DEFAULT_FOOTER_RES: Lazy<Vec<Regex>> =
    Lazy::new(|| FOOTER_PREFIXES.iter().filter_map(|p| prefix_regex(p)).collect());

/// Case-insensitive regex for a footer phrase, tolerant to spacing differences.
fn prefix_regex(prefix: &str) -> Option<Regex> {
    let body = prefix
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s*");
    if body.is_empty() {
        return None;
    }
    match Regex::new(&format!("(?i){}", body)) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(prefix, error = %e, "ignoring footer prefix");
            None
        }
    }
}

/// Compiled boilerplate tables for one pipeline run.
#[derive(Debug, Clone)]
pub(crate) struct Boilerplate {
    patterns: Vec<Regex>,
    footers: Vec<Regex>,
}

impl Boilerplate {
    pub(crate) fn from_config(config: &ParsingConfig) -> Self {
        let footers = match &config.footer_prefixes {
            ListOverride::Default => DEFAULT_FOOTER_RES.clone(),
            other => {
                let defaults: Vec<String> = FOOTER_PREFIXES.iter().map(|s| s.to_string()).collect();
                other
                    .resolve(&defaults)
                    .iter()
                    .filter_map(|p| prefix_regex(p))
                    .collect()
            }
        };
        Self {
            patterns: config.boilerplate_patterns.resolve(&BOILERPLATE_PATTERNS),
            footers,
        }
    }

    /// One removal pass over every pattern, then trailing-space trim per line.
    fn strip_once(&self, text: &str) -> String {
        let mut out = text.to_string();
        for re in &self.patterns {
            if re.is_match(&out) {
                out = re.replace_all(&out, "").into_owned();
            }
        }
        trim_line_ends(&out)
    }

    /// Apply removal passes until nothing changes. Removing one fragment can
    /// splice two halves of another together, so a single pass is not enough.
    pub(crate) fn strip(&self, text: &str) -> String {
        let mut current = text.to_string();
        loop {
            let next = self.strip_once(&current);
            if next == current {
                return next;
            }
            current = next;
        }
    }

    pub(crate) fn is_footer_line(&self, line: &str) -> bool {
        let line = line.trim_start();
        self.footers
            .iter()
            .any(|re| re.find(line).is_some_and(|m| m.start() == 0))
    }

    /// Remove boilerplate from one answer and cut it at the first footer phrase.
    pub(crate) fn clean_answer(&self, text: &str) -> String {
        let stripped = self.strip(text);
        let cut = self
            .footers
            .iter()
            .filter_map(|re| re.find(&stripped).map(|m| m.start()))
            .min()
            .unwrap_or(stripped.len());
        collapse_whitespace(&stripped[..cut])
    }
}

fn trim_line_ends(text: &str) -> String {
    text.split('\n')
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Strip page boilerplate from raw document text.
///
/// Also unifies line endings, expands ligatures and trims trailing whitespace.
/// Unmatched text passes through unchanged. Idempotent:
/// `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    normalize_with_config(text, &ParsingConfig::default())
}

/// Config-aware version of [`normalize`].
pub fn normalize_with_config(text: &str, config: &ParsingConfig) -> String {
    normalize_with_tables(text, &Boilerplate::from_config(config))
}

pub(crate) fn normalize_with_tables(text: &str, tables: &Boilerplate) -> String {
    let prepared = expand_ligatures(&unify_whitespace(text));
    tables.strip(&prepared)
}

/// Clean a single answer: strip boilerplate fragments, cut trailing footer
/// text (also when glued to the answer without a separator) and collapse whitespace.
pub fn clean_answer_text(text: &str) -> String {
    Boilerplate::from_config(&ParsingConfig::default()).clean_answer(text)
}

/// True if `line` starts with a known footer phrase.
pub fn is_footer_line(line: &str) -> bool {
    Boilerplate::from_config(&ParsingConfig::default()).is_footer_line(line)
}
