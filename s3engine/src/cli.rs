use clap::{Parser, Subcommand};
use s3engine::config::DEFAULT_PUBLIC_DOMAIN;
use s3engine::{CannedAcl, DirectoryPrefix};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "s3engine", version, about = "Store, fetch and dispose blobs in an S3 bucket")]
pub(crate) struct Cli {
    /// YAML engine config; when given, the connection flags below are ignored
    #[arg(short, long, env = "S3ENGINE_CONFIG")]
    pub(crate) config: Option<PathBuf>,

    /// Target bucket
    #[arg(
        short,
        long,
        env = "S3ENGINE_BUCKET",
        required_unless_present = "config"
    )]
    pub(crate) bucket: Option<String>,

    /// Bucket region
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub(crate) region: String,

    /// Canned ACL applied to stored objects by default
    #[arg(long, env = "S3ENGINE_ACL")]
    pub(crate) default_acl: Option<CannedAcl>,

    /// Endpoint of an S3-compatible store
    #[arg(long, env = "S3ENGINE_ENDPOINT_URL")]
    pub(crate) endpoint_url: Option<String>,

    /// Address buckets by path instead of by subdomain
    #[arg(long, env = "S3ENGINE_FORCE_PATH_STYLE")]
    pub(crate) force_path_style: bool,

    /// Domain used for unsigned object URLs
    #[arg(long, env = "S3ENGINE_PUBLIC_DOMAIN", default_value = DEFAULT_PUBLIC_DOMAIN)]
    pub(crate) public_domain: String,

    /// Objects removed alongside a key by `dispose-dir`: `versions` or `key`
    #[arg(long, env = "S3ENGINE_DIRECTORY_PREFIX", default_value = "versions")]
    pub(crate) directory_prefix: DirectoryPrefix,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Upload a file and print its key
    Store {
        file: PathBuf,
        /// Object key; a random one is generated when omitted
        #[arg(short, long)]
        key: Option<String>,
        #[arg(short, long)]
        mimetype: Option<String>,
        /// Filename recorded in Content-Disposition (defaults to the file's name)
        #[arg(short, long)]
        name: Option<String>,
        /// ACL for this object only
        #[arg(long)]
        acl: Option<CannedAcl>,
    },
    /// Download an object to a file or stdout
    Retrieve {
        key: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the object's public URL, or a presigned one with --expires-in
    Uri {
        key: String,
        /// Lifetime of the presigned URL in seconds
        #[arg(short, long)]
        expires_in: Option<u64>,
    },
    /// Delete an object
    Dispose { key: String },
    /// Delete an object and every object grouped under it
    DisposeDir { key: String },
}
