//! Library crate for s3engine: an S3-compatible storage engine that a blob
//! storage layer plugs in through `StorageEngine`.

pub mod config;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod s3_engine;
pub mod stream;
pub mod transport;

pub use config::{CannedAcl, Credentials, DirectoryPrefix, EngineConfig, load_config};
pub use descriptor::{BlobDescriptor, PresignOptions, PutOptions};
pub use engine::StorageEngine;
pub use error::{ConfigError, TransportError};
pub use s3_engine::S3Engine;
pub use stream::{ObjectStream, collect_stream};
pub use transport::{MemoryTransport, ObjectTransport, PutRequest, S3Transport};
