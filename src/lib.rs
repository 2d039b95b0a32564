//! Mini Memcache - A memcached-style in-memory cache server
//!
//! Provides set/add/replace/cas, append/prepend, increment/decrement, delete
//! and flush over an LRU cache with lazy TTL expiration and CAS versioning.

pub mod api;
pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod server;

pub use api::AppState;
pub use cache::CacheStore;
pub use config::Config;
pub use dispatcher::Dispatcher;
pub use error::{CacheError, ErrorCode, RpcError};
pub use server::{CacheServer, ServerHandle};
