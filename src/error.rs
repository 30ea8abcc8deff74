use crate::response::Status;
use serde::Serialize;
use thiserror::Error;

/// Error surfaced to the caller of the Lambda function.
#[derive(Debug, Serialize, Clone, Error)]
#[error("{status}: {msg}")]
pub struct ServiceError {
    pub msg: String,
    pub status: Status,
}

impl ServiceError {
    pub fn bad_request<T: std::fmt::Display>(msg: T) -> ServiceError {
        ServiceError {
            msg: msg.to_string(),
            status: Status::BadRequest,
        }
    }

    pub fn internal_server_error<T: std::fmt::Display>(msg: T) -> ServiceError {
        ServiceError {
            msg: msg.to_string(),
            status: Status::InternalServerError,
        }
    }
}
