use std::path::PathBuf;

use thiserror::Error;

pub mod export;

pub use export::{
    compress_ranges, diagnostic_report, log_path_for, question_store_json, serialize,
    write_outputs,
};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to serialize questions: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
