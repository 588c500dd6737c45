//! HTTP server wiring for filmrank.
//!
//! Holds the runtime configuration and assembles the [`filmrank_api`] router
//! with request tracing. The binary in `main.rs` picks a backend and serves
//! the result.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use filmrank_core::{
  RelationshipService,
  store::{EdgeStore, EntityStore},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Which backend holds users, films, and edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
  /// Everything is lost when the process exits.
  #[default]
  Memory,
  /// A single SQLite file at [`ServerConfig::store_path`].
  Sqlite,
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `FILMRANK_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default)]
  pub storage:    StorageKind,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/filmrank/filmrank.db") }

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `service`.
pub fn app<S>(service: Arc<RelationshipService<S>>) -> Router
where
  S: EntityStore + EdgeStore + 'static,
{
  filmrank_api::api_router(service).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use config::{Config, File, FileFormat};
  use filmrank_core::memory::MemoryStore;
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

  // ── Configuration ───────────────────────────────────────────────────────────

  #[test]
  fn empty_config_uses_defaults() {
    let cfg = load("");
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.storage, StorageKind::Memory);
    assert_eq!(cfg.store_path, PathBuf::from("~/.local/share/filmrank/filmrank.db"));
    assert_eq!(cfg.address(), "127.0.0.1:8080");
  }

  #[test]
  fn sqlite_storage_is_selectable() {
    let cfg = load(
      r#"
      host = "0.0.0.0"
      port = 9000
      storage = "sqlite"
      store_path = "/var/lib/filmrank.db"
      "#,
    );
    assert_eq!(cfg.storage, StorageKind::Sqlite);
    assert_eq!(cfg.store_path, PathBuf::from("/var/lib/filmrank.db"));
    assert_eq!(cfg.address(), "0.0.0.0:9000");
  }

  #[test]
  fn unknown_storage_is_rejected() {
    let result = Config::builder()
      .add_source(File::from_str(r#"storage = "redis""#, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize::<ServerConfig>();
    assert!(result.is_err());
  }

  // ── Router ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn traced_app_serves_api_routes() {
    let service = Arc::new(RelationshipService::new(Arc::new(MemoryStore::new())));
    let req = Request::builder().uri("/films/popular").body(Body::empty()).unwrap();

    let resp = app(service).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, serde_json::json!([]));
  }
}
