//! Error types for Outlay

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A record with an unparseable date or amount. Fails the whole
    /// normalization call, since silently dropping data is worse than a
    /// visible failure.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Forecast requested on too little history. Recoverable by the caller
    /// with a shorter horizon or more data.
    #[error("Insufficient history: {days} day(s) of data, need at least {required}")]
    InsufficientHistory { days: usize, required: usize },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A downstream collaborator (store, sink) failed. Produced by
    /// collaborator implementations, logged and skipped by the engine.
    #[error("Collaborator error: {0}")]
    Collaborator(String),
}

pub type Result<T> = std::result::Result<T, Error>;
