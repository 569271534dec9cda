use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub extraction: Option<ExtractionConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub expected_total: Option<u32>,
    pub min_question_chars: Option<usize>,
    pub preview_chars: Option<usize>,
    pub extra_boilerplate_patterns: Option<Vec<String>>,
    pub extra_footer_prefixes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub questions_path: Option<String>,
    pub log_path: Option<String>,
}

/// Platform config directory path: `<config_dir>/azf-extract/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("azf-extract").join("config.toml"))
}

/// Load config by cascading CWD `.azf.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".azf.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let be = base.extraction.unwrap_or_default();
    let oe = overlay.extraction.unwrap_or_default();
    let bo = base.output.unwrap_or_default();
    let oo = overlay.output.unwrap_or_default();

    ConfigFile {
        extraction: Some(ExtractionConfig {
            expected_total: oe.expected_total.or(be.expected_total),
            min_question_chars: oe.min_question_chars.or(be.min_question_chars),
            preview_chars: oe.preview_chars.or(be.preview_chars),
            extra_boilerplate_patterns: oe
                .extra_boilerplate_patterns
                .or(be.extra_boilerplate_patterns),
            extra_footer_prefixes: oe.extra_footer_prefixes.or(be.extra_footer_prefixes),
        }),
        output: Some(OutputConfig {
            questions_path: oo.questions_path.or(bo.questions_path),
            log_path: oo.log_path.or(bo.log_path),
        }),
    }
}
