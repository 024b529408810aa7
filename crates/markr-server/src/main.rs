//! markr-server binary.
//!
//! Reads `markr.toml` (or the path given with `--config`) layered under
//! `MARKR_*` environment variables, opens the SQLite store, and serves the
//! import and aggregate endpoints over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use markr_server::ServerConfig;
use markr_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Markr test result service")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "markr.toml")]
  config: PathBuf,

  /// Print the resolved configuration as JSON and exit.
  #[arg(long)]
  print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("MARKR"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if cli.print_config {
    println!("{}", serde_json::to_string_pretty(&server_cfg)?);
    return Ok(());
  }

  let store = if server_cfg.test_mode {
    tracing::warn!("test mode: using an in-memory database");
    SqliteStore::open_in_memory()
      .await
      .context("failed to open in-memory store")?
  } else {
    let path = expand_tilde(&server_cfg.database);
    SqliteStore::open(&path)
      .await
      .with_context(|| format!("failed to open store at {path:?}"))?
  };

  let app = markr_server::router(Arc::new(store));
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
