//! Errors while extracting, summarizing, or writing result rows.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResultsError {
    #[error("malformed result data: {what}")]
    Malformed { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ResultsResult<T> = Result<T, ResultsError>;
