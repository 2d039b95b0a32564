//! Request DTOs for the cache server API
//!
//! Defines the operation identifiers and the shape of incoming cache calls.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// == Operation ==
/// Cache operations a request can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Set,
    Cas,
    Get,
    Gets,
    Add,
    Replace,
    Delete,
    Touch,
    Append,
    Prepend,
    Increment,
    Decrement,
    FlushAll,
}

impl Operation {
    /// Every operation, in wire code order.
    pub const ALL: [Operation; 13] = [
        Operation::Set,
        Operation::Cas,
        Operation::Get,
        Operation::Gets,
        Operation::Add,
        Operation::Replace,
        Operation::Delete,
        Operation::Touch,
        Operation::Append,
        Operation::Prepend,
        Operation::Increment,
        Operation::Decrement,
        Operation::FlushAll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Set => "SET",
            Operation::Cas => "CAS",
            Operation::Get => "GET",
            Operation::Gets => "GETS",
            Operation::Add => "ADD",
            Operation::Replace => "REPLACE",
            Operation::Delete => "DELETE",
            Operation::Touch => "TOUCH",
            Operation::Append => "APPEND",
            Operation::Prepend => "PREPEND",
            Operation::Increment => "INCREMENT",
            Operation::Decrement => "DECREMENT",
            Operation::FlushAll => "FLUSHALL",
        }
    }

    /// Numeric wire code (position in [`Operation::ALL`]).
    pub fn code(&self) -> usize {
        Self::ALL.iter().position(|op| op == self).unwrap_or_default()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operation identifier that names no known operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation: {0}")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    /// Accepts names in any case, or numeric wire codes.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<usize>() {
            return Self::ALL
                .get(code)
                .copied()
                .ok_or_else(|| UnknownOperation(s.to_string()));
        }
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

// == Cache Item ==
/// Key/value payload carried by a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheItem {
    /// The cache key
    #[serde(default)]
    pub key: String,
    /// Value bytes for storing operations
    #[serde(default)]
    pub value: Vec<u8>,
    /// TTL in seconds, 0 = never expires
    #[serde(default)]
    pub ttl: u64,
    /// Expected CAS version for CAS
    #[serde(default)]
    pub cas: u64,
}

impl CacheItem {
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

    pub fn with_ttl(mut self, ttl_seconds: u64) -> Self {
        self.ttl = ttl_seconds;
        self
    }

    pub fn with_cas(mut self, cas: u64) -> Self {
        self.cas = cas;
        self
    }

    pub fn ttl_duration(&self) -> Duration {
        Duration::from_secs(self.ttl)
    }
}

// == Cache Request ==
/// Request body for a cache call (POST /call)
///
/// # Fields
/// - `operation`: operation name (`"SET"`, `"gets"`, ...) or numeric code
/// - `item`: key, value, ttl and expected CAS version
/// - `append` / `prepend`: bytes for APPEND and PREPEND
/// - `increment` / `decrement`: amounts for INCREMENT and DECREMENT
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CacheRequest {
    #[serde(default)]
    pub operation: String,
    #[serde(default)]
    pub item: CacheItem,
    #[serde(default)]
    pub append: Vec<u8>,
    #[serde(default)]
    pub prepend: Vec<u8>,
    #[serde(default)]
    pub increment: u64,
    #[serde(default)]
    pub decrement: u64,
}

impl CacheRequest {
    pub fn new(operation: Operation, item: CacheItem) -> Self {
        Self {
            operation: operation.as_str().to_string(),
            item,
            ..Self::default()
        }
    }

    pub fn with_append(mut self, suffix: impl Into<Vec<u8>>) -> Self {
        self.append = suffix.into();
        self
    }

    pub fn with_prepend(mut self, prefix: impl Into<Vec<u8>>) -> Self {
        self.prepend = prefix.into();
        self
    }

    pub fn with_increment(mut self, amount: u64) -> Self {
        self.increment = amount;
        self
    }

    pub fn with_decrement(mut self, amount: u64) -> Self {
        self.decrement = amount;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_from_name() {
        assert_eq!("SET".parse::<Operation>(), Ok(Operation::Set));
        assert_eq!("gets".parse::<Operation>(), Ok(Operation::Gets));
        assert_eq!("FlushAll".parse::<Operation>(), Ok(Operation::FlushAll));
        assert_eq!(
            "FROB".parse::<Operation>(),
            Err(UnknownOperation("FROB".to_string()))
        );
        assert!("".parse::<Operation>().is_err());
    }

    #[test]
    fn test_operation_from_code() {
        for op in Operation::ALL {
            assert_eq!(op.code().to_string().parse::<Operation>(), Ok(op));
        }
        assert_eq!("12".parse::<Operation>(), Ok(Operation::FlushAll));
        assert!("13".parse::<Operation>().is_err());
    }

    #[test]
    fn test_request_deserialize_minimal() {
        let json = r#"{"operation": "FLUSHALL"}"#;
        let req: CacheRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.operation, "FLUSHALL");
        assert_eq!(req.item, CacheItem::default());
    }

    #[test]
    fn test_request_deserialize_full() {
        let json = r#"{
            "operation": "CAS",
            "item": {"key": "foo", "value": [98, 97, 114], "ttl": 60, "cas": 7},
            "append": [1],
            "increment": 3
        }"#;
        let req: CacheRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.item.key, "foo");
        assert_eq!(req.item.value, b"bar");
        assert_eq!(req.item.ttl_duration(), Duration::from_secs(60));
        assert_eq!(req.item.cas, 7);
        assert_eq!(req.append, vec![1]);
        assert_eq!(req.increment, 3);
        assert_eq!(req.decrement, 0);
    }

    #[test]
    fn test_request_builders() {
        let req = CacheRequest::new(Operation::Append, CacheItem::new("k").with_ttl(5))
            .with_append("tail");
        assert_eq!(req.operation, "APPEND");
        assert_eq!(req.item.ttl, 5);
        assert_eq!(req.append, b"tail");
    }
}
