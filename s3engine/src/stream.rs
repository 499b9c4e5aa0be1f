use crate::error::TransportError;
use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;
use futures::stream::BoxStream;

/// Single-pass stream over an object's content, in order from the first
/// byte. Finite, and cannot be rewound: read it again with a new request.
pub type ObjectStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// Drains `stream` into one buffer, concatenating chunks in arrival order.
///
/// The first error ends the read; whatever was buffered so far is dropped.
pub async fn collect_stream(mut stream: ObjectStream) -> Result<Bytes, TransportError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = stream.try_next().await? {
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}
