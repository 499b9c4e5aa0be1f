//! S3 transport built on aws-sdk-s3. One request per primitive, except
//! listing (follows continuation tokens) and bulk delete (split into
//! batches of at most 1000 keys).

use super::{ObjectTransport, PutRequest};
use crate::config::EngineConfig;
use crate::descriptor::PresignOptions;
use crate::error::TransportError;
use crate::stream::ObjectStream;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials as SdkCredentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectCannedAcl, ObjectIdentifier, StorageClass};
use futures::{StreamExt, TryStreamExt};
use tokio_util::io::ReaderStream;

/// DeleteObjects accepts at most this many keys per request.
const MAX_DELETE_BATCH: usize = 1000;

#[derive(Clone, Debug)]
pub struct S3Transport {
    client: Client,
}

impl S3Transport {
    /// Builds a client for `config`: region, static credentials when set
    /// (otherwise the SDK provider chain), endpoint override and path style.
    pub async fn connect(config: &EngineConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(creds) = &config.credentials {
            loader = loader.credentials_provider(SdkCredentials::new(
                &creds.access_key_id,
                &creds.secret_access_key,
                creds.session_token.clone(),
                None,
                "s3engine",
            ));
        }
        if let Some(url) = &config.endpoint_url {
            loader = loader.endpoint_url(url);
        }
        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();
        Self {
            client: Client::from_conf(s3_config),
        }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl ObjectTransport for S3Transport {
    async fn put_object(&self, request: PutRequest) -> Result<(), TransportError> {
        let PutRequest {
            bucket,
            key,
            body,
            content_type,
            content_disposition,
            acl,
            cache_control,
            content_encoding,
            content_language,
            storage_class,
            metadata,
        } = request;

        let mut req = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_disposition(content_disposition)
            .set_content_type(content_type)
            .set_acl(acl.map(|acl| ObjectCannedAcl::from(acl.as_str())))
            .set_cache_control(cache_control)
            .set_content_encoding(content_encoding)
            .set_content_language(content_language)
            .set_storage_class(storage_class.as_deref().map(StorageClass::from));
        if !metadata.is_empty() {
            req = req.set_metadata(Some(metadata));
        }

        req.send()
            .await
            .map_err(|e| TransportError::sdk("put_object", e))?;
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectStream, TransportError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    TransportError::NoSuchKey(key.to_string())
                } else {
                    TransportError::sdk("get_object", e)
                }
            })?;

        let reader = output.body.into_async_read();
        Ok(ReaderStream::new(reader)
            .map_err(TransportError::from)
            .boxed())
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), TransportError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| TransportError::sdk("delete_object", e))?;
        Ok(())
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), TransportError> {
        let mut refused = Vec::new();

        for batch in keys.chunks(MAX_DELETE_BATCH) {
            let objects = batch
                .iter()
                .map(|key| ObjectIdentifier::builder().key(key).build())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| TransportError::sdk("delete_objects", e))?;
            let delete = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .map_err(|e| TransportError::sdk("delete_objects", e))?;

            let output = self
                .client
                .delete_objects()
                .bucket(bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|e| TransportError::sdk("delete_objects", e))?;

            // quiet mode: only the failures are reported back
            refused.extend(
                output
                    .errors()
                    .iter()
                    .filter_map(|err| err.key().map(String::from)),
            );
        }

        if !refused.is_empty() {
            return Err(TransportError::PartialDelete(refused));
        }
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<String>, TransportError> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .set_continuation_token(token.take())
                .send()
                .await
                .map_err(|e| TransportError::sdk("list_objects", e))?;

            keys.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|obj| obj.key().map(String::from)),
            );

            match output.next_continuation_token() {
                Some(next) if output.is_truncated().unwrap_or(false) => {
                    token = Some(next.to_string());
                }
                _ => break,
            }
        }

        Ok(keys)
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        options: &PresignOptions,
    ) -> Result<String, TransportError> {
        let mut builder = PresigningConfig::builder().expires_in(options.expires_in);
        if let Some(start) = options.start_time {
            builder = builder.start_time(start);
        }
        let presigning = builder
            .build()
            .map_err(|e| TransportError::Presign(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| TransportError::sdk("presign_get", e))?;
        Ok(presigned.uri().to_string())
    }
}
