//! In-process transport. Keeps objects in a map, records every call in
//! issue order and can be told to fail chosen operations, so engine
//! behaviour can be checked without a store.

use super::{ObjectTransport, PutRequest};
use crate::descriptor::PresignOptions;
use crate::error::TransportError;
use crate::stream::ObjectStream;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream;
use std::collections::{BTreeMap, HashSet};
use tokio::sync::{Mutex, RwLock};

const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Put,
    Get,
    Delete,
    DeleteMany,
    List,
    Presign,
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Operation::Put => "put_object",
            Operation::Get => "get_object",
            Operation::Delete => "delete_object",
            Operation::DeleteMany => "delete_objects",
            Operation::List => "list_objects",
            Operation::Presign => "presign_get",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Put(PutRequest),
    Get {
        bucket: String,
        key: String,
    },
    Delete {
        bucket: String,
        key: String,
    },
    DeleteMany {
        bucket: String,
        keys: Vec<String>,
    },
    List {
        bucket: String,
        prefix: String,
    },
    Presign {
        bucket: String,
        key: String,
        options: PresignOptions,
    },
}

impl TransportCall {
    pub fn operation(&self) -> Operation {
        match self {
            TransportCall::Put(_) => Operation::Put,
            TransportCall::Get { .. } => Operation::Get,
            TransportCall::Delete { .. } => Operation::Delete,
            TransportCall::DeleteMany { .. } => Operation::DeleteMany,
            TransportCall::List { .. } => Operation::List,
            TransportCall::Presign { .. } => Operation::Presign,
        }
    }
}

pub struct MemoryTransport {
    objects: RwLock<BTreeMap<(String, String), PutRequest>>,
    calls: Mutex<Vec<TransportCall>>,
    failing: RwLock<HashSet<Operation>>,
    chunk_size: usize,
    body_fails_after: Option<usize>,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            failing: RwLock::new(HashSet::new()),
            chunk_size: DEFAULT_CHUNK_SIZE,
            body_fails_after: None,
        }
    }

    /// Size of the chunks `get_object` streams; zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Make every body stream error out after `chunks` chunks.
    pub fn with_body_failure_after(mut self, chunks: usize) -> Self {
        self.body_fails_after = Some(chunks);
        self
    }

    /// Fail every subsequent call of `op` (the call is still recorded).
    pub async fn fail(&self, op: Operation) {
        self.failing.write().await.insert(op);
    }

    pub async fn recover(&self, op: Operation) {
        self.failing.write().await.remove(&op);
    }

    pub async fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().await.clone()
    }

    pub async fn clear_calls(&self) {
        self.calls.lock().await.clear();
    }

    pub async fn object(&self, bucket: &str, key: &str) -> Option<PutRequest> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub async fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    async fn record(&self, call: TransportCall) -> Result<(), TransportError> {
        let op = call.operation();
        self.calls.lock().await.push(call);
        if self.failing.read().await.contains(&op) {
            return Err(TransportError::rejected(op.name(), "injected failure"));
        }
        Ok(())
    }

    fn chunked(&self, body: Bytes) -> ObjectStream {
        let mut chunks: Vec<Result<Bytes, TransportError>> = Vec::new();
        let mut offset = 0;
        while offset < body.len() {
            let end = (offset + self.chunk_size).min(body.len());
            chunks.push(Ok(body.slice(offset..end)));
            offset = end;
        }
        if let Some(limit) = self.body_fails_after {
            chunks.truncate(limit);
            chunks.push(Err(TransportError::Body(std::io::Error::other(
                "connection reset while reading body",
            ))));
        }
        stream::iter(chunks).boxed()
    }
}

#[async_trait]
impl ObjectTransport for MemoryTransport {
    async fn put_object(&self, request: PutRequest) -> Result<(), TransportError> {
        self.record(TransportCall::Put(request.clone())).await?;
        self.objects
            .write()
            .await
            .insert((request.bucket.clone(), request.key.clone()), request);
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectStream, TransportError> {
        self.record(TransportCall::Get {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
        .await?;
        let body = self
            .object(bucket, key)
            .await
            .map(|obj| obj.body)
            .ok_or_else(|| TransportError::NoSuchKey(key.to_string()))?;
        Ok(self.chunked(body))
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), TransportError> {
        self.record(TransportCall::Delete {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
        .await?;
        self.objects
            .write()
            .await
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), TransportError> {
        self.record(TransportCall::DeleteMany {
            bucket: bucket.to_string(),
            keys: keys.to_vec(),
        })
        .await?;
        let mut objects = self.objects.write().await;
        for key in keys {
            objects.remove(&(bucket.to_string(), key.clone()));
        }
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<String>, TransportError> {
        self.record(TransportCall::List {
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
        })
        .await?;
        Ok(self
            .keys(bucket)
            .await
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        options: &PresignOptions,
    ) -> Result<String, TransportError> {
        self.record(TransportCall::Presign {
            bucket: bucket.to_string(),
            key: key.to_string(),
            options: *options,
        })
        .await?;
        Ok(format!(
            "memory://{bucket}/{key}?expires_in={}",
            options.expires_in.as_secs()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::collect_stream;
    use std::time::Duration;

    fn put(bucket: &str, key: &str, body: &'static [u8]) -> PutRequest {
        PutRequest {
            bucket: bucket.into(),
            key: key.into(),
            body: Bytes::from_static(body),
            content_type: None,
            content_disposition: "filename=\"x\"".into(),
            acl: None,
            cache_control: None,
            content_encoding: None,
            content_language: None,
            storage_class: None,
            metadata: Default::default(),
        }
    }

    #[tokio::test]
    async fn body_is_streamed_in_chunks() {
        let transport = MemoryTransport::new().with_chunk_size(3);
        transport.put_object(put("b", "k", b"abcdefgh")).await.unwrap();

        let chunks: Vec<_> = transport
            .get_object("b", "k")
            .await
            .unwrap()
            .map(|c| c.unwrap())
            .collect()
            .await;
        assert_eq!(chunks, vec!["abc", "def", "gh"]);
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let transport = MemoryTransport::new();
        let err = match transport.get_object("b", "missing").await {
            Ok(_) => panic!("expected missing key"),
            Err(err) => err,
        };
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn buckets_are_isolated() {
        let transport = MemoryTransport::new();
        transport.put_object(put("a", "k", b"1")).await.unwrap();
        transport.put_object(put("b", "k-V1", b"2")).await.unwrap();

        assert_eq!(transport.list_objects("a", "k").await.unwrap(), vec!["k"]);
        assert_eq!(transport.list_objects("b", "k").await.unwrap(), vec!["k-V1"]);
    }

    #[tokio::test]
    async fn injected_failures_are_recorded_then_cleared() {
        let transport = MemoryTransport::new();
        transport.fail(Operation::Delete).await;
        let err = transport.delete_object("b", "k").await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::Rejected {
                operation: "delete_object",
                ..
            }
        ));

        transport.recover(Operation::Delete).await;
        transport.delete_object("b", "k").await.unwrap();
        assert_eq!(transport.calls().await.len(), 2);
    }

    #[tokio::test]
    async fn body_failure_after_first_chunk() {
        let transport = MemoryTransport::new()
            .with_chunk_size(2)
            .with_body_failure_after(1);
        transport.put_object(put("b", "k", b"abcd")).await.unwrap();
        let stream = transport.get_object("b", "k").await.unwrap();
        assert!(matches!(
            collect_stream(stream).await,
            Err(TransportError::Body(_))
        ));
    }

    #[tokio::test]
    async fn presign_is_deterministic() {
        let transport = MemoryTransport::new();
        let url = transport
            .presign_get("b", "k", &PresignOptions::expires_in(Duration::from_secs(100)))
            .await
            .unwrap();
        assert_eq!(url, "memory://b/k?expires_in=100");
    }
}
