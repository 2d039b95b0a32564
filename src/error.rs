//! Error types for the cache server
//!
//! [`CacheError`] is what the store reports. [`RpcError`] is what leaves the
//! dispatcher: a transport-facing code plus a message.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::cache::CounterError;
use crate::models::{ErrorResponse, Operation};

// == Cache Error Enum ==
/// Failures reported by the cache store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key absent, or found expired at access time
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key present when absence was required, or CAS version mismatch
    #[error("Key exists: {0}")]
    AlreadyExists(String),

    /// Stored value is not a valid encoded counter
    #[error("Value for key {key} is not a counter: {source}")]
    Decode {
        key: String,
        #[source]
        source: CounterError,
    },
}

// == Result Type Alias ==
/// Convenience Result type for store operations.
pub type Result<T> = std::result::Result<T, CacheError>;

// == Error Code ==
/// Error kinds exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotFound,
    AlreadyExists,
    InvalidArgument,
    Unimplemented,
}

impl ErrorCode {
    /// Client-facing name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "not found",
            ErrorCode::AlreadyExists => "already exists",
            ErrorCode::InvalidArgument => "invalid argument",
            ErrorCode::Unimplemented => "unimplemented",
        }
    }

    /// HTTP status the code is rendered as.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::AlreadyExists => StatusCode::CONFLICT,
            ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorCode::Unimplemented => StatusCode::NOT_IMPLEMENTED,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == RPC Error ==
/// Error returned by the dispatcher for a single request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct RpcError {
    pub code: ErrorCode,
    pub message: String,
}

impl RpcError {
    /// Creates an RpcError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Maps a store failure for `op` onto its client-facing code.
    pub fn from_cache(op: Operation, err: CacheError) -> Self {
        match err {
            CacheError::NotFound(key) => Self::new(
                ErrorCode::NotFound,
                format!("{} error: '{}' not found", op, key),
            ),
            CacheError::AlreadyExists(key) => Self::new(
                ErrorCode::AlreadyExists,
                format!("{} error: '{}' exists", op, key),
            ),
            CacheError::Decode { key, source } => Self::new(
                ErrorCode::InvalidArgument,
                format!("{} error: '{}' is not a counter: {}", op, key, source),
            ),
        }
    }

    /// Error for an operation identifier the dispatcher does not know.
    pub fn unimplemented(operation: &str) -> Self {
        Self::new(
            ErrorCode::Unimplemented,
            format!("unrecognized cache command {}", operation),
        )
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse::new(self.code.as_str(), self.message));
        (self.code.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_mapping() {
        let err = RpcError::from_cache(Operation::Get, CacheError::NotFound("foo".into()));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "GET error: 'foo' not found");
    }

    #[test]
    fn test_already_exists_mapping() {
        let err = RpcError::from_cache(Operation::Add, CacheError::AlreadyExists("foo".into()));
        assert_eq!(err.code, ErrorCode::AlreadyExists);
        assert_eq!(err.code.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_decode_maps_to_invalid_argument() {
        let err = RpcError::from_cache(
            Operation::Increment,
            CacheError::Decode {
                key: "foo".into(),
                source: CounterError::Truncated,
            },
        );
        assert_eq!(err.code, ErrorCode::InvalidArgument);
        assert!(err.message.contains("truncated"));
    }

    #[test]
    fn test_unimplemented() {
        let err = RpcError::unimplemented("FROB");
        assert_eq!(err.code.as_str(), "unimplemented");
        assert_eq!(err.code.status(), StatusCode::NOT_IMPLEMENTED);
        assert_eq!(err.to_string(), "unrecognized cache command FROB");
    }
}
