//! JSON REST API and server wiring for everkeep.
//!
//! Exposes an axum [`Router`] over any [`RecordStore`] (for record
//! creation and viewing) and any [`Submitter`] (for QR-code requests).
//! TLS and auth are the caller's responsibility.

pub mod error;
pub mod memorials;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use everkeep_core::{memorial::MemorialId, store::RecordStore};
use everkeep_pipeline::{Submitter, notify::TemplateCredentials};
use serde::Deserialize;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered
/// under `EVERKEEP_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  /// Public origin the view links are built against.
  pub public_base_url:  String,
  pub store_path:       PathBuf,
  /// Fixed contact the compose fallback is addressed to.
  pub operator_email:   String,
  pub photo_bucket_url: String,
  pub submissions_url:  String,
  /// Templated-transport credentials. Absent is a valid state: every
  /// notification then goes out as a compose draft.
  #[serde(default)]
  pub notify:           Option<TemplateCredentials>,
}

impl ServerConfig {
  /// The public view URL for a memorial.
  pub fn memorial_url(&self, id: &MemorialId) -> String {
    format!("{}/memorials/{id}", self.public_base_url.trim_end_matches('/'))
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, Q> {
  pub store:     Arc<S>,
  pub submitter: Arc<Q>,
  pub config:    Arc<ServerConfig>,
}

// Manual impl: the pipeline behind `Q` is not `Clone`, only its `Arc` is.
impl<S, Q> Clone for AppState<S, Q> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      submitter: Arc::clone(&self.submitter),
      config:    Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the everkeep API.
pub fn router<S, Q>(state: AppState<S, Q>) -> Router
where
  S: RecordStore + 'static,
  Q: Submitter + 'static,
{
  Router::new()
    .route("/api/memorials", post(memorials::create::<S, Q>))
    .route("/api/memorials/{id}", get(memorials::get_one::<S, Q>))
    .route(
      "/api/memorials/{id}/qr-requests",
      post(memorials::request_qr::<S, Q>),
    )
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
