//! API Module
//!
//! HTTP handlers and routing for the cache server RPC surface.
//!
//! # Endpoints
//! - `POST /call` - Run the operation named in the request body
//! - `POST /cache/:operation` - Run the operation named in the path
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
