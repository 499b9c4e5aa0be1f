use crate::config::CannedAcl;
use bytes::Bytes;
use std::collections::HashMap;
use std::time::{Duration, SystemTime};

/// A blob handed over by the storage layer: payload plus display metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobDescriptor {
    pub data: Bytes,
    pub name: String,
    pub mimetype: Option<String>,
}

impl BlobDescriptor {
    pub fn new(data: impl Into<Bytes>, name: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            name: name.into(),
            mimetype: None,
        }
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = Some(mimetype.into());
        self
    }

    /// Value of the `Content-Disposition` header stored with the object.
    pub fn content_disposition(&self) -> String {
        format!("filename=\"{}\"", self.name)
    }
}

/// Per-call overrides for `store`.
///
/// Bucket, key, body, content type and content disposition cannot be set
/// here; they always come from the engine and the descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutOptions {
    pub acl: Option<CannedAcl>,
    pub cache_control: Option<String>,
    pub content_encoding: Option<String>,
    pub content_language: Option<String>,
    pub storage_class: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl PutOptions {
    pub fn with_acl(mut self, acl: CannedAcl) -> Self {
        self.acl = Some(acl);
        self
    }

    pub fn with_cache_control(mut self, value: impl Into<String>) -> Self {
        self.cache_control = Some(value.into());
        self
    }

    pub fn with_storage_class(mut self, value: impl Into<String>) -> Self {
        self.storage_class = Some(value.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Options for a presigned GET URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresignOptions {
    pub expires_in: Duration,
    pub start_time: Option<SystemTime>,
}

impl PresignOptions {
    pub fn expires_in(expires_in: Duration) -> Self {
        Self {
            expires_in,
            start_time: None,
        }
    }

    pub fn starting_at(mut self, start_time: SystemTime) -> Self {
        self.start_time = Some(start_time);
        self
    }
}
