//! Object transport (the wire side of the engine)
//!
//! Submodules:
//! - `s3`: `aws-sdk-s3` backed transport
//! - `memory`: in-process transport that records every call, for tests and
//!   offline use
//!
//! One method per store primitive. Implementations must be safe to share
//! across concurrent calls; the engine holds one behind an `Arc` and never
//! locks around it.

pub mod memory;
pub mod s3;

use crate::config::CannedAcl;
use crate::descriptor::PresignOptions;
use crate::error::TransportError;
use crate::stream::ObjectStream;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;

pub use memory::{MemoryTransport, Operation, TransportCall};
pub use s3::S3Transport;

/// Everything a single put sends to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutRequest {
    pub bucket: String,
    pub key: String,
    pub body: Bytes,
    pub content_type: Option<String>,
    pub content_disposition: String,
    pub acl: Option<CannedAcl>,
    pub cache_control: Option<String>,
    pub content_encoding: Option<String>,
    pub content_language: Option<String>,
    pub storage_class: Option<String>,
    pub metadata: HashMap<String, String>,
}

#[async_trait]
pub trait ObjectTransport: Send + Sync {
    async fn put_object(&self, request: PutRequest) -> Result<(), TransportError>;

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectStream, TransportError>;

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), TransportError>;

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), TransportError>;

    /// Every key in `bucket` starting with `prefix`, across all listing pages.
    async fn list_objects(&self, bucket: &str, prefix: &str)
    -> Result<Vec<String>, TransportError>;

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        options: &PresignOptions,
    ) -> Result<String, TransportError>;
}
