//! Request Dispatcher
//!
//! Maps a named operation onto the cache store. One mutex guards the store
//! for the whole of each call, so calls never interleave.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{encode_counter, CacheStore};
use crate::error::RpcError;
use crate::models::{CacheItem, CacheRequest, CacheResponse, Operation, ResponseItem};

/// Shared handle that serializes every call into one [`CacheStore`].
#[derive(Clone, Debug)]
pub struct Dispatcher {
    cache: Arc<Mutex<CacheStore>>,
}

impl Dispatcher {
    /// Wraps a store. The store must not be shared any other way.
    pub fn new(cache: CacheStore) -> Self {
        Self {
            cache: Arc::new(Mutex::new(cache)),
        }
    }

    /// Runs the operation named in `request`.
    ///
    /// Unknown operations are rejected before the store is locked.
    pub async fn call(&self, request: CacheRequest) -> Result<CacheResponse, RpcError> {
        let op: Operation = request
            .operation
            .parse()
            .map_err(|_| RpcError::unimplemented(&request.operation))?;

        debug!(operation = %op, key = %request.item.key, "dispatching cache call");

        let mut cache = self.cache.lock().await;
        execute(&mut cache, op, request)
    }

    /// Runs `f` with the store locked, for callers that need several
    /// operations to happen atomically.
    pub async fn with_cache<R>(&self, f: impl FnOnce(&mut CacheStore) -> R) -> R {
        let mut cache = self.cache.lock().await;
        f(&mut cache)
    }
}

fn execute(
    cache: &mut CacheStore,
    op: Operation,
    request: CacheRequest,
) -> Result<CacheResponse, RpcError> {
    let ttl = request.item.ttl_duration();
    let CacheRequest {
        item:
            CacheItem {
                key,
                value,
                cas: expected,
                ..
            },
        append,
        prepend,
        increment,
        decrement,
        ..
    } = request;
    let key = key.as_str();
    let fail = |err| RpcError::from_cache(op, err);

    let item = match op {
        Operation::Set => {
            let cas = cache.set(key, value, ttl);
            ResponseItem::new(key).with_cas(cas)
        }
        Operation::Cas => {
            let cas = cache.cas(key, value, ttl, expected).map_err(fail)?;
            ResponseItem::new(key).with_cas(cas)
        }
        Operation::Get => {
            let value = cache.get(key).map_err(fail)?;
            ResponseItem::new(key).with_value(value)
        }
        Operation::Gets => {
            let (value, cas) = cache.gets(key).map_err(fail)?;
            ResponseItem::new(key).with_value(value).with_cas(cas)
        }
        Operation::Add => {
            let cas = cache.add(key, value, ttl).map_err(fail)?;
            ResponseItem::new(key).with_cas(cas)
        }
        Operation::Replace => {
            let cas = cache.replace(key, value, ttl).map_err(fail)?;
            ResponseItem::new(key).with_cas(cas)
        }
        Operation::Delete => {
            cache.delete(key);
            return Ok(CacheResponse::empty());
        }
        Operation::Touch => {
            let cas = cache.touch(key, ttl).map_err(fail)?;
            ResponseItem::new(key).with_cas(cas)
        }
        Operation::Append => {
            let cas = cache.append(key, &append, ttl).map_err(fail)?;
            ResponseItem::new(key).with_cas(cas)
        }
        Operation::Prepend => {
            let cas = cache.prepend(key, &prepend, ttl).map_err(fail)?;
            ResponseItem::new(key).with_cas(cas)
        }
        Operation::Increment => {
            let update = cache.increment(key, increment).map_err(fail)?;
            ResponseItem::new(key)
                .with_value(encode_counter(update.value))
                .with_cas(update.cas)
        }
        Operation::Decrement => {
            let update = cache.decrement(key, decrement).map_err(fail)?;
            ResponseItem::new(key)
                .with_value(encode_counter(update.value))
                .with_cas(update.cas)
        }
        Operation::FlushAll => {
            cache.flush_all();
            return Ok(CacheResponse::empty());
        }
    };

    Ok(CacheResponse::with_item(item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::decode_counter;
    use crate::error::ErrorCode;
    use tokio_test::{assert_err, assert_ok};

    fn dispatcher(max_entries: usize) -> Dispatcher {
        Dispatcher::new(CacheStore::new(max_entries))
    }

    fn request(op: Operation, key: &str) -> CacheRequest {
        CacheRequest::new(op, CacheItem::new(key))
    }

    fn set(key: &str, value: &[u8]) -> CacheRequest {
        CacheRequest::new(Operation::Set, CacheItem::new(key).with_value(value))
    }

    async fn value_of(d: &Dispatcher, key: &str) -> Vec<u8> {
        let resp = assert_ok!(d.call(request(Operation::Get, key)).await);
        resp.item.unwrap().value
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let d = dispatcher(0);

        let resp = assert_ok!(d.call(set("foo", b"bar")).await);
        assert_eq!(resp.item, Some(ResponseItem::new("foo").with_cas(1)));

        let resp = assert_ok!(d.call(request(Operation::Get, "foo")).await);
        assert_eq!(resp.item, Some(ResponseItem::new("foo").with_value("bar")));
    }

    #[tokio::test]
    async fn test_gets_and_cas() {
        let d = dispatcher(0);
        assert_ok!(d.call(set("foo", b"bar")).await);

        let resp = assert_ok!(d.call(request(Operation::Gets, "foo")).await);
        assert_eq!(resp.item.as_ref().map(|i| i.cas), Some(1));

        let swap = CacheRequest::new(
            Operation::Cas,
            CacheItem::new("foo").with_value("bluh").with_cas(1),
        );
        assert_ok!(d.call(swap).await);

        let resp = assert_ok!(d.call(request(Operation::Gets, "foo")).await);
        assert_eq!(
            resp.item,
            Some(ResponseItem::new("foo").with_value("bluh").with_cas(2))
        );

        let stale = CacheRequest::new(
            Operation::Cas,
            CacheItem::new("foo").with_value("nope").with_cas(9),
        );
        let err = assert_err!(d.call(stale).await);
        assert_eq!(err.code, ErrorCode::AlreadyExists);
    }

    #[tokio::test]
    async fn test_add_and_replace() {
        let d = dispatcher(0);
        let add = CacheRequest::new(Operation::Add, CacheItem::new("foo").with_value("bar"));

        assert_ok!(d.call(add.clone()).await);
        let err = assert_err!(d.call(add).await);
        assert_eq!(err.code, ErrorCode::AlreadyExists);
        assert_eq!(err.message, "ADD error: 'foo' exists");

        let replace = |key: &str| {
            CacheRequest::new(Operation::Replace, CacheItem::new(key).with_value("rar"))
        };
        let err = assert_err!(d.call(replace("missing")).await);
        assert_eq!(err.code, ErrorCode::NotFound);

        assert_ok!(d.call(replace("foo")).await);
        assert_eq!(value_of(&d, "foo").await, b"rar");
    }

    #[tokio::test]
    async fn test_delete_and_flush_return_no_item() {
        let d = dispatcher(0);
        assert_ok!(d.call(set("a", b"1")).await);
        assert_ok!(d.call(set("b", b"2")).await);

        let resp = assert_ok!(d.call(request(Operation::Delete, "a")).await);
        assert_eq!(resp.item, None);
        // deleting again is not an error
        assert_ok!(d.call(request(Operation::Delete, "a")).await);

        let resp = assert_ok!(d.call(CacheRequest::new(Operation::FlushAll, CacheItem::default())).await);
        assert_eq!(resp.item, None);
        assert!(d.with_cache(|cache| cache.is_empty()).await);
    }

    #[tokio::test]
    async fn test_touch_append_prepend() {
        let d = dispatcher(0);
        let err = assert_err!(d.call(request(Operation::Touch, "foo")).await);
        assert_eq!(err.code, ErrorCode::NotFound);

        assert_ok!(d.call(set("foo", b"bar")).await);
        let resp = assert_ok!(d.call(request(Operation::Touch, "foo")).await);
        assert_eq!(resp.item.map(|i| i.cas), Some(2));

        assert_ok!(d.call(request(Operation::Append, "foo").with_append("tail")).await);
        assert_ok!(d.call(request(Operation::Prepend, "foo").with_prepend("head")).await);
        assert_eq!(value_of(&d, "foo").await, b"headbartail");

        let err = assert_err!(d.call(request(Operation::Append, "nope").with_append("x")).await);
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_increment_decrement() {
        let d = dispatcher(0);
        assert_ok!(d.call(set("foo", &encode_counter(20))).await);

        let resp = assert_ok!(d.call(request(Operation::Increment, "foo").with_increment(23)).await);
        let item = resp.item.unwrap();
        assert_eq!(decode_counter(&item.value), Ok(43));
        assert_eq!(decode_counter(&value_of(&d, "foo").await), Ok(43));

        assert_ok!(d.call(request(Operation::Decrement, "foo").with_decrement(23)).await);
        assert_eq!(decode_counter(&value_of(&d, "foo").await), Ok(20));
    }

    #[tokio::test]
    async fn test_increment_on_non_counter() {
        let d = dispatcher(0);
        assert_ok!(d.call(set("foo", &[0x80])).await);

        let err = assert_err!(d.call(request(Operation::Increment, "foo").with_increment(1)).await);
        assert_eq!(err.code, ErrorCode::InvalidArgument);

        let err = assert_err!(d.call(request(Operation::Decrement, "missing").with_decrement(1)).await);
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let d = dispatcher(0);
        let req = CacheRequest {
            operation: "FROB".to_string(),
            ..CacheRequest::default()
        };

        let err = assert_err!(d.call(req).await);
        assert_eq!(err.code, ErrorCode::Unimplemented);
        assert_eq!(d.with_cache(|cache| cache.len()).await, 0);
    }

    #[tokio::test]
    async fn test_lru_through_dispatcher() {
        let d = dispatcher(3);
        for key in ["foo", "bar", "thing", "another"] {
            let add = CacheRequest::new(Operation::Add, CacheItem::new(key).with_value(key));
            assert_ok!(d.call(add).await);
        }

        let err = assert_err!(d.call(request(Operation::Get, "foo")).await);
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(value_of(&d, "another").await, b"another");
    }

    #[tokio::test]
    async fn test_with_cache_batches_operations() {
        let d = dispatcher(0);

        let (first, second) = d
            .with_cache(|cache| {
                let first = cache.set("a", b"1".to_vec(), Default::default());
                let second = cache.add("a", b"2".to_vec(), Default::default());
                (first, second)
            })
            .await;

        assert_eq!(first, 1);
        assert!(second.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_calls_get_unique_versions() {
        let d = dispatcher(0);
        let mut handles = Vec::new();

        for i in 0..64 {
            let d = d.clone();
            handles.push(tokio::spawn(async move {
                let key = format!("key{}", i % 8);
                let resp = d.call(set(&key, b"v")).await.unwrap();
                resp.item.unwrap().cas
            }));
        }

        let mut versions = Vec::new();
        for handle in handles {
            versions.push(handle.await.unwrap());
        }
        versions.sort_unstable();
        assert_eq!(versions, (1..=64).collect::<Vec<u64>>());
    }
}
