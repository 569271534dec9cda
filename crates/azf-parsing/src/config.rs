use regex::Regex;

/// Controls how a list of patterns/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

pub(crate) const DEFAULT_MIN_QUESTION_CHARS: usize = 10;
pub(crate) const DEFAULT_PREVIEW_CHARS: usize = 100;

/// Configuration for the question extraction pipeline.
///
/// Pattern tables start from built-in defaults tuned for the AZF catalogue
/// layout. Use [`ParsingConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct ParsingConfig {
    // ── normalize.rs ──
    /// Boilerplate fragments removed wherever they occur.
    pub(crate) boilerplate_patterns: ListOverride<Regex>,
    /// Footer phrases: lines starting with one are dropped, answers are cut at one.
    pub(crate) footer_prefixes: ListOverride<String>,

    // ── segment.rs ──
    /// Regex for question-number candidates. Group 1 is the number, group 2 the first prompt token.
    pub(crate) question_marker_re: Option<Regex>,
    /// Tokens that turn a line-leading number into a measurement, not a marker.
    pub(crate) unit_tokens: ListOverride<String>,

    // ── record.rs ──
    /// A prompt must be strictly longer than this many characters (default: 10).
    pub(crate) min_question_chars: usize,
    /// Length of the prompt excerpt kept in skip diagnostics (default: 100).
    pub(crate) preview_chars: usize,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            boilerplate_patterns: ListOverride::Default,
            footer_prefixes: ListOverride::Default,
            question_marker_re: None,
            unit_tokens: ListOverride::Default,
            min_question_chars: DEFAULT_MIN_QUESTION_CHARS,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

impl ParsingConfig {
    pub fn min_question_chars(&self) -> usize {
        self.min_question_chars
    }

    pub fn preview_chars(&self) -> usize {
        self.preview_chars
    }
}

/// Builder for [`ParsingConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
/// Fails fast with `regex::Error` if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct ParsingConfigBuilder {
    boilerplate_patterns: ListOverrideBuilder,
    footer_prefixes: ListOverride<String>,
    question_marker_re: Option<String>,
    unit_tokens: ListOverride<String>,
    min_question_chars: Option<usize>,
    preview_chars: Option<usize>,
}

/// Helper for building `ListOverride<Regex>` from string patterns.
#[derive(Debug, Clone, Default)]
enum ListOverrideBuilder {
    #[default]
    Default,
    Replace(Vec<String>),
    Extend(Vec<String>),
}

fn push_extend<T>(list: &mut ListOverride<T>, value: T) {
    match list {
        ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(value),
        ListOverride::Default => *list = ListOverride::Extend(vec![value]),
    }
}

impl ParsingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Boilerplate ──

    pub fn set_boilerplate_patterns(mut self, patterns: Vec<String>) -> Self {
        self.boilerplate_patterns = ListOverrideBuilder::Replace(patterns);
        self
    }

    pub fn add_boilerplate_pattern(mut self, pattern: String) -> Self {
        match &mut self.boilerplate_patterns {
            ListOverrideBuilder::Extend(v) | ListOverrideBuilder::Replace(v) => v.push(pattern),
            ListOverrideBuilder::Default => {
                self.boilerplate_patterns = ListOverrideBuilder::Extend(vec![pattern])
            }
        }
        self
    }

    pub fn set_footer_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.footer_prefixes = ListOverride::Replace(prefixes);
        self
    }

    pub fn add_footer_prefix(mut self, prefix: String) -> Self {
        push_extend(&mut self.footer_prefixes, prefix);
        self
    }

    // ── Segmentation ──

    pub fn question_marker_regex(mut self, pattern: &str) -> Self {
        self.question_marker_re = Some(pattern.to_string());
        self
    }

    pub fn set_unit_tokens(mut self, tokens: Vec<String>) -> Self {
        self.unit_tokens = ListOverride::Replace(tokens);
        self
    }

    pub fn add_unit_token(mut self, token: String) -> Self {
        push_extend(&mut self.unit_tokens, token);
        self
    }

    // ── Scalars ──

    pub fn min_question_chars(mut self, n: usize) -> Self {
        self.min_question_chars = Some(n);
        self
    }

    pub fn preview_chars(mut self, n: usize) -> Self {
        self.preview_chars = Some(n);
        self
    }

    /// Compile all string patterns into regexes and produce a [`ParsingConfig`].
    pub fn build(self) -> Result<ParsingConfig, regex::Error> {
        let compile_list =
            |builder: ListOverrideBuilder| -> Result<ListOverride<Regex>, regex::Error> {
                match builder {
                    ListOverrideBuilder::Default => Ok(ListOverride::Default),
                    ListOverrideBuilder::Replace(patterns) => {
                        let regexes: Result<Vec<_>, _> =
                            patterns.iter().map(|p| Regex::new(p)).collect();
                        Ok(ListOverride::Replace(regexes?))
                    }
                    ListOverrideBuilder::Extend(patterns) => {
                        let regexes: Result<Vec<_>, _> =
                            patterns.iter().map(|p| Regex::new(p)).collect();
                        Ok(ListOverride::Extend(regexes?))
                    }
                }
            };

        Ok(ParsingConfig {
            boilerplate_patterns: compile_list(self.boilerplate_patterns)?,
            footer_prefixes: self.footer_prefixes,
            question_marker_re: self
                .question_marker_re
                .map(|p| Regex::new(&p))
                .transpose()?,
            unit_tokens: self.unit_tokens,
            min_question_chars: self
                .min_question_chars
                .unwrap_or(DEFAULT_MIN_QUESTION_CHARS),
            preview_chars: self.preview_chars.unwrap_or(DEFAULT_PREVIEW_CHARS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParsingConfig::default();
        assert_eq!(config.min_question_chars, 10);
        assert_eq!(config.preview_chars, 100);
        assert!(config.question_marker_re.is_none());
    }

    #[test]
    fn test_builder_basic() {
        let config = ParsingConfigBuilder::new()
            .min_question_chars(3)
            .preview_chars(40)
            .build()
            .unwrap();
        assert_eq!(config.min_question_chars, 3);
        assert_eq!(config.preview_chars, 40);
    }

    #[test]
    fn test_builder_extends_boilerplate() {
        let config = ParsingConfigBuilder::new()
            .add_boilerplate_pattern(r"(?i)Ausgabe \d{4}".to_string())
            .add_boilerplate_pattern(r"Entwurf".to_string())
            .build()
            .unwrap();
        match config.boilerplate_patterns {
            ListOverride::Extend(v) => assert_eq!(v.len(), 2),
            other => panic!("expected Extend, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_invalid_regex() {
        let result = ParsingConfigBuilder::new()
            .add_boilerplate_pattern(r"[invalid".to_string())
            .build();
        assert!(result.is_err());

        let result = ParsingConfigBuilder::new()
            .question_marker_regex(r"(\d+")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_unit_tokens_extend_and_replace() {
        let builtin: Vec<String> = crate::segment::UNIT_TOKENS
            .iter()
            .map(|s| s.to_string())
            .collect();

        let config = ParsingConfigBuilder::new().build().unwrap();
        assert_eq!(config.unit_tokens.resolve(&builtin), builtin);

        let config = ParsingConfigBuilder::new()
            .add_unit_token("Anrufe".to_string())
            .build()
            .unwrap();
        let units = config.unit_tokens.resolve(&builtin);
        assert_eq!(units.len(), builtin.len() + 1);
        assert!(units.iter().any(|u| u == "MHz"));
        assert_eq!(units.last().map(String::as_str), Some("Anrufe"));

        let config = ParsingConfigBuilder::new()
            .add_unit_token("Anrufe".to_string())
            .set_unit_tokens(vec!["kHz".to_string()])
            .build()
            .unwrap();
        assert_eq!(config.unit_tokens.resolve(&builtin), vec!["kHz".to_string()]);
    }
}
