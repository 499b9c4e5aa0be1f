mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use futures::TryStreamExt;
use s3engine::{
    BlobDescriptor, EngineConfig, PresignOptions, PutOptions, S3Engine, StorageEngine,
    load_config,
};
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = engine_config(&cli)?;
    info!(bucket = %config.bucket, region = %config.region, "using bucket");
    let engine = S3Engine::new(config).await?;

    run(&engine, cli.command).await
}

fn engine_config(cli: &Cli) -> Result<EngineConfig> {
    if let Some(path) = &cli.config {
        return load_config(path)
            .with_context(|| format!("failed to load engine config {}", path.display()));
    }

    let bucket = cli
        .bucket
        .clone()
        .context("either --bucket or --config is required")?;
    let mut config = EngineConfig::new(bucket)
        .with_region(&cli.region)
        .with_force_path_style(cli.force_path_style)
        .with_public_domain(&cli.public_domain)
        .with_directory_prefix(cli.directory_prefix);
    if let Some(acl) = cli.default_acl {
        config = config.with_acl(acl);
    }
    if let Some(url) = &cli.endpoint_url {
        config = config.with_endpoint_url(url);
    }
    config.validate()?;
    Ok(config)
}

async fn run(engine: &dyn StorageEngine, command: Commands) -> Result<()> {
    match command {
        Commands::Store {
            file,
            key,
            mimetype,
            name,
            acl,
        } => {
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let name = name
                .or_else(|| {
                    file.file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                })
                .unwrap_or_else(|| "blob".to_string());
            let mut descriptor = BlobDescriptor::new(data, name);
            descriptor.mimetype = mimetype;

            let key = key.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let options = acl.map(|acl| PutOptions::default().with_acl(acl));
            engine.store(&key, &descriptor, options).await?;
            info!(key = %key, size = descriptor.data.len(), "stored object");
            println!("{key}");
        }
        Commands::Retrieve { key, output } => {
            let mut stream = engine.retrieve_stream(&key).await?;
            let mut writer: Box<dyn AsyncWrite + Unpin + Send> = match &output {
                Some(path) => Box::new(
                    tokio::fs::File::create(path)
                        .await
                        .with_context(|| format!("failed to create {}", path.display()))?,
                ),
                None => Box::new(tokio::io::stdout()),
            };
            let mut written = 0usize;
            while let Some(chunk) = stream.try_next().await? {
                writer.write_all(&chunk).await?;
                written += chunk.len();
            }
            writer.flush().await?;
            info!(key = %key, size = written, "retrieved object");
        }
        Commands::Uri { key, expires_in } => {
            let presign =
                expires_in.map(|secs| PresignOptions::expires_in(Duration::from_secs(secs)));
            let uri = engine.retrieve_uri(&key, presign.as_ref()).await?;
            println!("{uri}");
        }
        Commands::Dispose { key } => {
            engine.dispose(&key).await?;
            info!(key = %key, "disposed object");
        }
        Commands::DisposeDir { key } => {
            engine.dispose_directory(&key).await?;
            info!(key = %key, "disposed directory");
        }
    }
    Ok(())
}
