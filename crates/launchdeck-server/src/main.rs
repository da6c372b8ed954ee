//! launchdeck binary.
//!
//! Reads `launchdeck.toml` (or the path given with `--config`) plus
//! `LAUNCHDECK_*` environment overrides, opens the SQLite store, and either
//! serves the JSON API or runs a one-shot sync.
//!
//! ```text
//! launchdeck serve
//! launchdeck sync rockets
//! launchdeck health
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use launchdeck_api::AppState;
use launchdeck_core::entity::EntityKind;
use launchdeck_store_sqlite::SqliteStore;
use launchdeck_sync::{SyncService, UpstreamClient};
use tokio::net::TcpListener;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use settings::{Settings, expand_tilde};

#[derive(Parser)]
#[command(author, version, about = "Launch dashboard backend with upstream sync")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "launchdeck.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API (the default).
  Serve,
  /// Run one sync and print the tallies as JSON.
  Sync {
    #[arg(value_enum, default_value_t = SyncTarget::All)]
    target: SyncTarget,
  },
  /// Check whether the upstream API is reachable.
  Health,
}

#[derive(Clone, Copy, ValueEnum)]
enum SyncTarget {
  All,
  Launches,
  Rockets,
  Launchpads,
}

impl SyncTarget {
  fn kind(self) -> Option<EntityKind> {
    match self {
      Self::All => None,
      Self::Launches => Some(EntityKind::Launch),
      Self::Rockets => Some(EntityKind::Rocket),
      Self::Launchpads => Some(EntityKind::Launchpad),
    }
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(settings).await,
    Command::Sync { target } => sync(settings, target).await,
    Command::Health => health(settings).await,
  }
}

async fn open_sync(settings: &Settings) -> anyhow::Result<SyncService<SqliteStore>> {
  let store_path = expand_tilde(&settings.server.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  SyncService::from_config(Arc::new(store), &settings.spacex)
    .context("failed to build upstream client")
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
  let sync = open_sync(&settings).await?;
  let app = launchdeck_api::api_router(AppState::new(sync));
  let address = settings.server.address();

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  info!("shutting down");
}

async fn sync(settings: Settings, target: SyncTarget) -> anyhow::Result<()> {
  let service = open_sync(&settings).await?;
  let tallies = match target.kind() {
    Some(kind) => vec![service.sync(kind).await?],
    None => service.sync_all().await?,
  };
  println!("{}", serde_json::to_string_pretty(&tallies)?);
  Ok(())
}

async fn health(settings: Settings) -> anyhow::Result<()> {
  let client = UpstreamClient::from_config(&settings.spacex)?;
  if client.health_check().await {
    println!("upstream reachable: {}", settings.spacex.api_base_url);
    Ok(())
  } else {
    anyhow::bail!("upstream unreachable: {}", settings.spacex.api_base_url)
  }
}
