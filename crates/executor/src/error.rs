use thiserror::Error;

use common::error::Error as PathEngineError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Channel sender failed: Receiver has been dropped.")]
    ChannelSendFailed,

    #[error("Graph processing error: {0}")]
    GraphError(#[from] PathEngineError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Invalid update on line {line}: {reason}")]
    InvalidUpdate { line: u64, reason: String },

    #[error("Configuration error: {0}")]
    ConfigLoadError(String),
}
