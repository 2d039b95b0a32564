//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::{Deserialize, Serialize};

/// Item echoed back by a successful cache call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseItem {
    /// The requested key
    pub key: String,
    /// Stored value, empty unless the operation reads or computes one
    #[serde(default)]
    pub value: Vec<u8>,
    /// CAS version, 0 unless the operation reports one
    #[serde(default)]
    pub cas: u64,
}

impl ResponseItem {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_cas(mut self, cas: u64) -> Self {
        self.cas = cas;
        self
    }
}

/// Response body for a cache call
///
/// `item` is absent for DELETE and FLUSHALL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ResponseItem>,
}

impl CacheResponse {
    pub fn with_item(item: ResponseItem) -> Self {
        Self { item: Some(item) }
    }

    pub fn empty() -> Self {
        Self { item: None }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Client-facing error code ("not found", "already exists", ...)
    pub code: String,
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(code: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            error: error.into(),
        }
    }
}
