//! API Handlers
//!
//! HTTP request handlers that hand decoded cache calls to the dispatcher.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheStore, TracingEvictionHandler};
use crate::dispatcher::Dispatcher;
use crate::error::{ErrorCode, RpcError};
use crate::models::{CacheRequest, CacheResponse, HealthResponse};

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Serialized access to the cache store
    pub dispatcher: Dispatcher,
}

impl AppState {
    /// Creates a new AppState around the given cache store.
    pub fn new(cache: CacheStore) -> Self {
        Self {
            dispatcher: Dispatcher::new(cache),
        }
    }

    /// Creates a new AppState with a fresh store whose evictions are logged
    /// through tracing.
    pub fn with_max_entries(max_entries: usize) -> Self {
        let cache = CacheStore::new(max_entries).with_eviction_handler(TracingEvictionHandler);
        Self::new(cache)
    }
}

/// Handler for POST /call
///
/// Runs the operation named in the request body.
pub async fn call_handler(
    State(state): State<AppState>,
    Json(req): Json<CacheRequest>,
) -> Result<Json<CacheResponse>, RpcError> {
    let response = state.dispatcher.call(req).await?;
    Ok(Json(response))
}

/// Handler for POST /cache/:operation
///
/// Runs the operation named in the path, ignoring any in the body.
/// The body may be left empty for calls that need no item, like FLUSHALL.
pub async fn operation_handler(
    State(state): State<AppState>,
    Path(operation): Path<String>,
    body: Bytes,
) -> Result<Json<CacheResponse>, RpcError> {
    let mut req = if body.is_empty() {
        CacheRequest::default()
    } else {
        serde_json::from_slice::<CacheRequest>(&body).map_err(|err| {
            RpcError::new(
                ErrorCode::InvalidArgument,
                format!("invalid request body: {}", err),
            )
        })?
    };
    req.operation = operation;
    let response = state.dispatcher.call(req).await?;
    Ok(Json(response))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
