//! Process shell for Roost: configuration and the top-level router.
//!
//! The binary in `main.rs` owns the store's lifecycle. It opens the store
//! once at startup, shares it with every handler, and closes it on shutdown.

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use roost_core::store::AnimalStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `roost.toml` and `ROOST_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:          String,
  #[serde(default = "default_port")]
  pub port:          u16,
  /// Database file, relative to the working directory unless absolute.
  #[serde(default = "default_database_path")]
  pub database_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 5233 }

fn default_database_path() -> PathBuf { PathBuf::from("roost.db") }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:          default_host(),
      port:          default_port(),
      database_path: default_database_path(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: the JSON API under `/api`, plus a
/// liveness probe.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: AnimalStore + 'static,
{
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", roost_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}
