use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use azf_core::config_file::{self, ConfigFile};
use azf_parsing::{ParsingConfig, ParsingConfigBuilder, QuestionExtractor};

mod output;

use output::ColorMode;

/// Number of questions in the current AZF catalogue.
const DEFAULT_EXPECTED_TOTAL: u32 = 289;
const DEFAULT_QUESTIONS_PATH: &str = "questions.json";
const EXPECTED_TOTAL_ENV: &str = "AZF_EXPECTED_TOTAL";

/// AZF question extractor - Turn the official AZF exam catalogue into a quiz question store
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the question catalogue (PDF, or plain text with form-feed page breaks)
    input: PathBuf,

    /// Path of the JSON question store [default: questions.json]
    output: Option<PathBuf>,

    /// Path of the extraction log [default: <output stem>_extraction_log.txt]
    #[arg(long)]
    log: Option<PathBuf>,

    /// Number of questions the catalogue should contain
    #[arg(long)]
    expected_total: Option<u32>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Extract and print the diagnostic report without writing any file
    #[arg(long)]
    dry_run: bool,

    /// Log per-question decisions
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let file_config = config_file::load_config();
    let expected_total = resolve_expected_total(
        cli.expected_total,
        std::env::var(EXPECTED_TOTAL_ENV).ok(),
        &file_config,
    )?;
    let parsing_config = parsing_config(&file_config)?;
    tracing::debug!(expected_total, input = %cli.input.display(), "resolved configuration");

    let color = ColorMode(!cli.no_color && std::io::stdout().is_terminal());

    if !cli.input.exists() {
        anyhow::bail!("File not found: {}", cli.input.display());
    }
    let file_name = cli
        .input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| cli.input.display().to_string());

    let extractor = QuestionExtractor::with_config(parsing_config);
    let result = azf_ingest::extract_questions(&cli.input, &extractor, expected_total)
        .with_context(|| format!("failed to extract questions from {}", cli.input.display()))?;

    let mut writer = std::io::stdout().lock();

    if cli.dry_run {
        if color.enabled() {
            writeln!(writer, "{} {}\n", "DRY RUN:".bold().cyan(), file_name.bold())?;
        } else {
            writeln!(writer, "DRY RUN: {}\n", file_name)?;
        }
        output::print_summary(&mut writer, &file_name, &result, color)?;
        write!(writer, "{}", azf_reporting::diagnostic_report(&result))?;
        return Ok(());
    }

    let (questions_path, log_path) = output_paths(cli.output, cli.log, &file_config);
    azf_reporting::write_outputs(&result, &questions_path, &log_path)?;

    output::print_summary(&mut writer, &file_name, &result, color)?;
    output::print_outputs(&mut writer, &questions_path, &log_path, color)?;
    output::print_sample(&mut writer, &result, color)?;
    output::print_skip_warning(&mut writer, &result, &log_path, color)?;

    Ok(())
}

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,azf={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// CLI flag > environment variable > config file > built-in default.
fn resolve_expected_total(
    flag: Option<u32>,
    env: Option<String>,
    file_config: &ConfigFile,
) -> anyhow::Result<u32> {
    let from_env = env
        .map(|v| {
            v.trim()
                .parse::<u32>()
                .with_context(|| format!("{} must be a positive number, got {:?}", EXPECTED_TOTAL_ENV, v))
        })
        .transpose()?;
    let from_file = file_config
        .extraction
        .as_ref()
        .and_then(|e| e.expected_total);

    let total = flag
        .or(from_env)
        .or(from_file)
        .unwrap_or(DEFAULT_EXPECTED_TOTAL);
    if total == 0 {
        anyhow::bail!("expected total must be at least 1");
    }
    Ok(total)
}

/// Build the parsing config from the `[extraction]` section.
fn parsing_config(file_config: &ConfigFile) -> anyhow::Result<ParsingConfig> {
    let mut builder = ParsingConfigBuilder::new();
    if let Some(ext) = &file_config.extraction {
        for pattern in ext.extra_boilerplate_patterns.iter().flatten() {
            builder = builder.add_boilerplate_pattern(pattern.clone());
        }
        for prefix in ext.extra_footer_prefixes.iter().flatten() {
            builder = builder.add_footer_prefix(prefix.clone());
        }
        if let Some(n) = ext.min_question_chars {
            builder = builder.min_question_chars(n);
        }
        if let Some(n) = ext.preview_chars {
            builder = builder.preview_chars(n);
        }
    }
    builder
        .build()
        .context("invalid boilerplate pattern in config file")
}

/// Resolve output paths: CLI > config file > defaults. The log defaults to a
/// sibling of the question store.
fn output_paths(
    output: Option<PathBuf>,
    log: Option<PathBuf>,
    file_config: &ConfigFile,
) -> (PathBuf, PathBuf) {
    let file_output = file_config.output.as_ref();
    let questions_path = output
        .or_else(|| file_output.and_then(|o| o.questions_path.as_ref()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_QUESTIONS_PATH));
    let log_path = log
        .or_else(|| file_output.and_then(|o| o.log_path.as_ref()).map(PathBuf::from))
        .unwrap_or_else(|| azf_reporting::log_path_for(Path::new(&questions_path)));
    (questions_path, log_path)
}
