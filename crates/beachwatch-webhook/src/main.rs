//! beachwatch webhook server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `BEACHWATCH_*` environment variables, opens the SQLite store and either
//! serves the webhook over HTTP or runs one retention pass and exits.
//!
//! ```text
//! server --config /etc/beachwatch.toml serve
//! server prune
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use beachwatch_core::store::BeachStore as _;
use beachwatch_store_sqlite::SqliteStore;
use beachwatch_webhook::{AppState, ServerConfig, dataset::HttpDatasetSource};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Beach condition webhook server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Default)]
enum Command {
  /// Serve the webhook (default).
  #[default]
  Serve,
  /// Delete conditions older than the retention window and exit.
  Prune,
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
    .add_source(config::Environment::with_prefix("BEACHWATCH"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command.unwrap_or_default() {
    Command::Serve => serve(store, server_cfg).await,
    Command::Prune => prune(store, &server_cfg).await,
  }
}

async fn serve(store: SqliteStore, server_cfg: ServerConfig) -> anyhow::Result<()> {
  let datasets = HttpDatasetSource::new(
    server_cfg.dataset_api_base.clone(),
    server_cfg.dataset_api_token.clone(),
    Duration::from_secs(server_cfg.dataset_timeout_secs),
  )
  .context("failed to build dataset client")?;

  tracing::info!(
    identity_policy = %server_cfg.identity_policy,
    retention = ?server_cfg.retention(),
    "starting webhook receiver"
  );

  let state = AppState {
    store:    Arc::new(store),
    datasets: Arc::new(datasets),
    policy:   Arc::new(server_cfg.identity_policy),
    config:   Arc::new(server_cfg.clone()),
  };

  let app = beachwatch_webhook::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// One retention pass, independent of `prune_enabled`.
async fn prune(store: SqliteStore, server_cfg: &ServerConfig) -> anyhow::Result<()> {
  let window = chrono::Duration::hours(i64::from(server_cfg.retention_hours));
  let cutoff = chrono::Utc::now() - window;

  let removed = store
    .prune_conditions(cutoff)
    .await
    .context("failed to prune conditions")?;

  tracing::info!(removed, %cutoff, "pruned conditions");
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
