// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Everything the advisory pipeline can report to a caller.
///
/// Most of these are masked by a documented default in lenient mode; only
/// `DatasetNotFound` and `Render` abort a strict request.
#[derive(Error, Debug)]
pub enum AdvisoryError {
    #[error("dataset not found at {}", path.display())]
    DatasetNotFound { path: PathBuf },

    #[error("failed to parse dataset {}: {source}", path.display())]
    DatasetParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("unsupported intent `{0}`")]
    UnsupportedIntent(String),

    #[error("unsupported language `{0}`")]
    UnsupportedLanguage(String),

    #[error("template error: missing {key}")]
    Render { key: String },

    #[error("yield predictor unavailable: {0}")]
    PredictorUnavailable(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AdvisoryError>;
