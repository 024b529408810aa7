//! HTTP service for Markr.
//!
//! Exposes an axum [`Router`] backed by any [`ScoreStore`]: document
//! ingestion on `POST /import` and aggregate statistics on
//! `GET /results/{test_id}/aggregate`.

pub mod error;
pub mod import;
pub mod results;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use markr_core::store::ScoreStore;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

/// Largest accepted result document.
pub const MAX_DOCUMENT_BYTES: usize = 8 * 1024 * 1024;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `markr.toml` and
/// `MARKR_*` environment variables.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:      String,
  pub port:      u16,
  /// SQLite database file.
  pub database:  PathBuf,
  /// Use a throwaway in-memory database instead of `database`.
  pub test_mode: bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:      "127.0.0.1".to_string(),
      port:      4567,
      database:  PathBuf::from("markr.db"),
      test_mode: false,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the Markr service.
pub fn router<S>(store: Arc<S>) -> Router
where
  S: ScoreStore + 'static,
{
  Router::new()
    .route("/import", post(import::handler::<S>))
    .route("/results/{test_id}/aggregate", get(results::aggregate::<S>))
    .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES))
    .layer(TraceLayer::new_for_http())
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
