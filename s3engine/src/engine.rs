use crate::descriptor::{BlobDescriptor, PresignOptions, PutOptions};
use crate::error::TransportError;
use crate::stream::{ObjectStream, collect_stream};
use async_trait::async_trait;
use bytes::Bytes;

/// Contract a storage engine fulfils so a blob storage layer can plug it in.
///
/// Keys are opaque tokens owned by the caller; engines store them verbatim.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    async fn store(
        &self,
        key: &str,
        descriptor: &BlobDescriptor,
        options: Option<PutOptions>,
    ) -> Result<(), TransportError>;

    async fn retrieve_stream(&self, key: &str) -> Result<ObjectStream, TransportError>;

    /// Whole object in memory. Reads through `retrieve_stream`, so large
    /// objects should be streamed instead.
    async fn retrieve(&self, key: &str) -> Result<Bytes, TransportError> {
        collect_stream(self.retrieve_stream(key).await?).await
    }

    /// A signed, expiring URL when `presign` is given, otherwise the public
    /// URL of the object.
    async fn retrieve_uri(
        &self,
        key: &str,
        presign: Option<&PresignOptions>,
    ) -> Result<String, TransportError>;

    async fn dispose(&self, key: &str) -> Result<(), TransportError>;

    /// Removes `key` together with the objects grouped under it.
    async fn dispose_directory(&self, _key: &str) -> Result<(), TransportError> {
        Err(TransportError::Unsupported("dispose_directory"))
    }
}
