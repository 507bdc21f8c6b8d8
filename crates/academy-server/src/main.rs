//! Academy server binary.
//!
//! Reads `academy.toml` (or the path given with `--config`) layered with
//! `ACADEMY_*` environment variables, opens the configured store, seeds it
//! with the sample academy when empty, and serves the JSON API under `/api`.
//!
//! Nested keys use a double underscore: `ACADEMY_STORE__BACKEND=sqlite`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use academy_core::store::AcademyStore;
use academy_server::{Backend, ServerConfig};
use academy_store_memory::MemoryStore;
use academy_store_sqlite::SqliteStore;
use anyhow::Context as _;
use clap::Parser;
use tokio::{net::TcpListener, signal};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Academy administration server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "academy.toml")]
  config: PathBuf,

  /// Use the in-memory store whatever the configuration says.
  #[arg(long)]
  memory: bool,
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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ACADEMY").separator("__"))
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  if cli.memory {
    server_cfg.store.backend = Backend::Memory;
  }

  match server_cfg.store.backend {
    Backend::Memory => {
      info!("using in-memory store");
      serve(MemoryStore::new(), &server_cfg).await
    }
    Backend::Sqlite => {
      let store_path = expand_tilde(&server_cfg.store.path);
      let store = SqliteStore::open(&store_path)
        .await
        .with_context(|| format!("failed to open store at {store_path:?}"))?;
      info!(path = %store_path.display(), "using SQLite store");
      serve(store, &server_cfg).await
    }
  }
}

async fn serve<S: AcademyStore + 'static>(store: S, server_cfg: &ServerConfig) -> anyhow::Result<()> {
  if server_cfg.seed_fixtures {
    academy_server::seed(&store)
      .await
      .context("failed to seed fixtures")?;
  }

  let app = academy_server::app(Arc::new(store));
  let address = server_cfg.address();

  info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  info!("server stopped");
  Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = signal::ctrl_c().await {
      tracing::error!("failed to listen for Ctrl-C: {e}");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
      Ok(mut sigterm) => {
        sigterm.recv().await;
      }
      Err(e) => {
        tracing::error!("failed to listen for SIGTERM: {e}");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => {},
    _ = terminate => {},
  }
  info!("shutting down");
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
