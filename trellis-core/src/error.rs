// Error types for Trellis endpoints

use crate::HttpStatus;
use thiserror::Error;

/// Errors a handler can answer with
#[derive(Error, Debug)]
pub enum Error {
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unprocessable Entity: {0}")]
    UnprocessableEntity(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        self.http_status().code()
    }

    /// Get the HttpStatus enum for this error
    pub fn http_status(&self) -> HttpStatus {
        match self {
            Error::Deserialization(_) => HttpStatus::BadRequest,
            Error::Forbidden(_) => HttpStatus::Forbidden,
            Error::UnprocessableEntity(_) => HttpStatus::UnprocessableEntity,
            Error::Serialization(_) | Error::Internal(_) => HttpStatus::InternalServerError,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.http_status().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.http_status().is_server_error()
    }
}
