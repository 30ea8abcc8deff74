use page_dedup_service::error::ServiceError;
use thiserror::Error;

/// Reasons a single document is excluded from clustering. These never abort a run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("document has no shingles")]
    Empty,
}

/// Failures that abort a whole run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("no prime modulus above {bound} could be found")]
    Domain { bound: u64 },

    #[error("document source unreadable: {0}")]
    Io(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("report could not be written: {0}")]
    Report(String),

    #[error("worker task failed: {0}")]
    Task(String),

    #[error("run cancelled")]
    Cancelled,
}

impl From<PipelineError> for ServiceError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Config(_) => ServiceError::bad_request(err),
            _ => ServiceError::internal_server_error(err),
        }
    }
}
