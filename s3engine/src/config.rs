use crate::error::ConfigError;
use serde::Deserialize;
use std::{fmt, fs, path::Path, str::FromStr};

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_PUBLIC_DOMAIN: &str = "s3.amazonaws.com";

/// Canned ACL applied to stored objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CannedAcl {
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
    AwsExecRead,
    BucketOwnerRead,
    BucketOwnerFullControl,
}

impl CannedAcl {
    pub fn as_str(&self) -> &'static str {
        match self {
            CannedAcl::Private => "private",
            CannedAcl::PublicRead => "public-read",
            CannedAcl::PublicReadWrite => "public-read-write",
            CannedAcl::AuthenticatedRead => "authenticated-read",
            CannedAcl::AwsExecRead => "aws-exec-read",
            CannedAcl::BucketOwnerRead => "bucket-owner-read",
            CannedAcl::BucketOwnerFullControl => "bucket-owner-full-control",
        }
    }
}

impl fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CannedAcl {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(CannedAcl::Private),
            "public-read" => Ok(CannedAcl::PublicRead),
            "public-read-write" => Ok(CannedAcl::PublicReadWrite),
            "authenticated-read" => Ok(CannedAcl::AuthenticatedRead),
            "aws-exec-read" => Ok(CannedAcl::AwsExecRead),
            "bucket-owner-read" => Ok(CannedAcl::BucketOwnerRead),
            "bucket-owner-full-control" => Ok(CannedAcl::BucketOwnerFullControl),
            other => Err(ConfigError::InvalidAcl(other.to_string())),
        }
    }
}

/// Which listing prefix `dispose_directory` uses for a base key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectoryPrefix {
    /// Only the versions of the key: everything under `<key>-V`.
    #[default]
    Versions,
    /// Everything whose key starts with the raw key. An empty key would
    /// match the whole bucket, so `dispose_directory` refuses it.
    Key,
}

impl DirectoryPrefix {
    pub fn prefix_for(&self, key: &str) -> String {
        match self {
            DirectoryPrefix::Versions => format!("{key}-V"),
            DirectoryPrefix::Key => key.to_string(),
        }
    }
}

impl FromStr for DirectoryPrefix {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "versions" => Ok(DirectoryPrefix::Versions),
            "key" => Ok(DirectoryPrefix::Key),
            other => Err(ConfigError::InvalidDirectoryPrefix(other.to_string())),
        }
    }
}

/// Static credential pair. When absent from the config the SDK provider
/// chain (environment, profile, instance metadata) is used instead.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default)]
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .finish()
    }
}

/// Engine configuration. Built once and handed to the engine, which never
/// mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub credentials: Option<Credentials>,
    /// Default ACL for every stored object, unless a call overrides it.
    #[serde(default)]
    pub acl: Option<CannedAcl>,
    /// Endpoint override for S3-compatible stores (MinIO, RustFS, ...).
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
    /// Domain of unsigned URLs: `https://<bucket>.<public_domain>/<key>`.
    #[serde(default = "default_public_domain")]
    pub public_domain: String,
    #[serde(default)]
    pub directory_prefix: DirectoryPrefix,
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_public_domain() -> String {
    DEFAULT_PUBLIC_DOMAIN.to_string()
}

impl EngineConfig {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: default_region(),
            credentials: None,
            acl: None,
            endpoint_url: None,
            force_path_style: false,
            public_domain: default_public_domain(),
            directory_prefix: DirectoryPrefix::default(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_acl(mut self, acl: CannedAcl) -> Self {
        self.acl = Some(acl);
        self
    }

    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    pub fn with_force_path_style(mut self, force: bool) -> Self {
        self.force_path_style = force;
        self
    }

    pub fn with_public_domain(mut self, domain: impl Into<String>) -> Self {
        self.public_domain = domain.into();
        self
    }

    pub fn with_directory_prefix(mut self, mode: DirectoryPrefix) -> Self {
        self.directory_prefix = mode;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket.trim().is_empty() {
            return Err(ConfigError::MissingBucket);
        }
        Ok(())
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = serde_yaml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Canonical public URL of `key`. Only reachable when the object or
    /// bucket allows anonymous reads.
    pub fn public_url(&self, key: &str) -> String {
        format!("https://{}.{}/{}", self.bucket, self.public_domain, key)
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    EngineConfig::from_yaml_str(&content)
}
