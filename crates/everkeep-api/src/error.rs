//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("a submission is already in progress")]
  SubmissionInFlight,

  #[error(transparent)]
  Storage(everkeep_store::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a generic record-store error, recognising the local store's
  /// both-tiers-failed case so it can surface as 503 with its actionable
  /// message rather than a bare 500.
  pub fn from_store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(e);
    match boxed.downcast::<everkeep_store::Error>() {
      Ok(e) => ApiError::Storage(*e),
      Err(boxed) => ApiError::Store(boxed),
    }
  }
}

impl From<everkeep_pipeline::Error> for ApiError {
  fn from(e: everkeep_pipeline::Error) -> Self {
    match e {
      everkeep_pipeline::Error::SubmissionInFlight => {
        ApiError::SubmissionInFlight
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::SubmissionInFlight => {
        (StatusCode::CONFLICT, self.to_string())
      }
      ApiError::Storage(everkeep_store::Error::StorageUnavailable) => {
        (StatusCode::SERVICE_UNAVAILABLE, self.to_string())
      }
      ApiError::Storage(e) => {
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
