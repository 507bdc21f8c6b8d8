//! Server wiring for Academy: configuration, fixture seeding and the HTTP
//! application.

use std::{path::PathBuf, sync::Arc};

use academy_core::{dataset::Dataset, store::AcademyStore};
use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  #[default]
  Memory,
  Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
  pub backend: Backend,
  /// Database file for the SQLite backend.
  pub path:    PathBuf,
}

impl Default for StoreConfig {
  fn default() -> Self { Self { backend: Backend::Memory, path: PathBuf::from("academy.db") } }
}

/// Runtime server configuration, deserialised from `academy.toml` and
/// `ACADEMY_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  pub store:         StoreConfig,
  /// Load the sample academy into an empty store on startup.
  pub seed_fixtures: bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:          "127.0.0.1".into(),
      port:          8080,
      store:         StoreConfig::default(),
      seed_fixtures: true,
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Application ──────────────────────────────────────────────────────────────

/// The full HTTP application: the JSON API under `/api` with request
/// tracing.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: AcademyStore + 'static,
{
  Router::new()
    .nest("/api", academy_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

/// Load the fixtures into `store` if it holds nothing. Returns whether it
/// did.
pub async fn seed<S: AcademyStore>(store: &S) -> Result<bool, S::Error> {
  if !store.snapshot().await?.is_empty() {
    return Ok(false);
  }
  store.restore(Dataset::fixtures()).await?;
  info!("seeded store with fixtures");
  Ok(true)
}

#[cfg(test)]
mod tests {
  use academy_core::people::Student;
  use academy_store_memory::MemoryStore;
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use config::{Config, File, FileFormat};
  use tower::ServiceExt as _;

  use super::*;

  fn load(toml: &str) -> ServerConfig {
    Config::builder()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_config_uses_defaults() {
    let config = load("");
    assert_eq!(config, ServerConfig::default());
    assert_eq!(config.address(), "127.0.0.1:8080");
    assert_eq!(config.store.backend, Backend::Memory);
    assert!(config.seed_fixtures);
  }

  #[test]
  fn config_file_overrides_fields() {
    let config = load(
      r#"
        port = 9000
        seed_fixtures = false

        [store]
        backend = "sqlite"
        path = "~/academy.db"
      "#,
    );
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 9000);
    assert!(!config.seed_fixtures);
    assert_eq!(config.store.backend, Backend::Sqlite);
    assert_eq!(config.store.path, PathBuf::from("~/academy.db"));
  }

  #[tokio::test]
  async fn seeds_only_an_empty_store() {
    let store = MemoryStore::new();
    assert!(seed(&store).await.unwrap());
    assert_eq!(store.list::<Student>().await.unwrap().len(), 7);

    store.remove::<Student>(3, Default::default()).await.unwrap();
    assert!(!seed(&store).await.unwrap());
    assert_eq!(store.list::<Student>().await.unwrap().len(), 6);
  }

  #[tokio::test]
  async fn api_is_nested_under_prefix() {
    let app = app(Arc::new(MemoryStore::fixtures()));

    let req = Request::builder().uri("/api/dashboard").body(Body::empty()).unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().uri("/dashboard").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
