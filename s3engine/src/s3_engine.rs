//! Storage engine backed by an S3-compatible object store.

use crate::config::EngineConfig;
use crate::descriptor::{BlobDescriptor, PresignOptions, PutOptions};
use crate::engine::StorageEngine;
use crate::error::{ConfigError, TransportError};
use crate::stream::ObjectStream;
use crate::transport::{ObjectTransport, PutRequest, S3Transport};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct S3Engine {
    config: EngineConfig,
    transport: Arc<dyn ObjectTransport>,
}

impl S3Engine {
    /// Validates `config` and connects a dedicated S3 client for it.
    pub async fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport = S3Transport::connect(&config).await;
        Ok(Self {
            config,
            transport: Arc::new(transport),
        })
    }

    pub fn with_transport(
        config: EngineConfig,
        transport: Arc<dyn ObjectTransport>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn put_request(
        &self,
        key: &str,
        descriptor: &BlobDescriptor,
        options: Option<PutOptions>,
    ) -> PutRequest {
        let options = options.unwrap_or_default();
        PutRequest {
            bucket: self.config.bucket.clone(),
            key: key.to_string(),
            body: descriptor.data.clone(),
            content_type: descriptor.mimetype.clone(),
            content_disposition: descriptor.content_disposition(),
            acl: options.acl.or(self.config.acl),
            cache_control: options.cache_control,
            content_encoding: options.content_encoding,
            content_language: options.content_language,
            storage_class: options.storage_class,
            metadata: options.metadata,
        }
    }
}

#[async_trait]
impl StorageEngine for S3Engine {
    async fn store(
        &self,
        key: &str,
        descriptor: &BlobDescriptor,
        options: Option<PutOptions>,
    ) -> Result<(), TransportError> {
        let request = self.put_request(key, descriptor, options);
        debug!(
            bucket = %self.config.bucket,
            key,
            size = request.body.len(),
            acl = ?request.acl,
            "storing object"
        );
        self.transport.put_object(request).await
    }

    async fn retrieve_stream(&self, key: &str) -> Result<ObjectStream, TransportError> {
        debug!(bucket = %self.config.bucket, key, "opening object stream");
        self.transport.get_object(&self.config.bucket, key).await
    }

    async fn retrieve_uri(
        &self,
        key: &str,
        presign: Option<&PresignOptions>,
    ) -> Result<String, TransportError> {
        match presign {
            Some(options) => {
                debug!(
                    bucket = %self.config.bucket,
                    key,
                    expires_in = ?options.expires_in,
                    "presigning object url"
                );
                self.transport
                    .presign_get(&self.config.bucket, key, options)
                    .await
            }
            None => Ok(self.config.public_url(key)),
        }
    }

    async fn dispose(&self, key: &str) -> Result<(), TransportError> {
        debug!(bucket = %self.config.bucket, key, "deleting object");
        self.transport.delete_object(&self.config.bucket, key).await
    }

    // list -> bulk delete -> delete base key. Not atomic. A failed bulk
    // delete still lets the base key go, and the bulk error wins.
    async fn dispose_directory(&self, key: &str) -> Result<(), TransportError> {
        if key.is_empty() {
            return Err(TransportError::EmptyKey("dispose_directory"));
        }
        let bucket = &self.config.bucket;
        let prefix = self.config.directory_prefix.prefix_for(key);

        let listed = self.transport.list_objects(bucket, &prefix).await?;
        debug!(
            bucket = %bucket,
            key,
            prefix = %prefix,
            count = listed.len(),
            "disposing directory"
        );

        let bulk = if listed.is_empty() {
            Ok(())
        } else {
            self.transport.delete_objects(bucket, &listed).await
        };
        let base = self.transport.delete_object(bucket, key).await;

        match (bulk, base) {
            (Ok(()), base) => base,
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(base_err)) => {
                warn!(key, error = %base_err, "base object delete also failed");
                Err(err)
            }
        }
    }
}
