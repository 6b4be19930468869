//! Handlers for `/api/memorials` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/memorials` | Create; responds with id, view path, validation |
//! | `GET`  | `/api/memorials/:id` | 404 if not found |
//! | `POST` | `/api/memorials/:id/qr-requests` | Runs the submission pipeline |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use everkeep_core::{
  memorial::{Memorial, MemorialId, NewMemorial},
  store::RecordStore,
  submission::Requester,
};
use everkeep_pipeline::{SubmissionOutcome, Submitter};
use serde::Serialize;
use tracing::info;

use crate::{AppState, error::ApiError};

// ─── Create ──────────────────────────────────────────────────────────────────

/// Creation response: where the record lives plus the completeness
/// verdict. Rule failures do not block creation — an incomplete record is
/// stored with `validated: false`.
#[derive(Debug, Serialize)]
pub struct CreatedMemorial {
  pub id:        MemorialId,
  pub view_path: String,
  pub validated: bool,
  pub errors:    Vec<String>,
}

/// `POST /api/memorials`
pub async fn create<S, Q>(
  State(state): State<AppState<S, Q>>,
  Json(input): Json<NewMemorial>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
  Q: Submitter,
{
  if input.full_name.trim().is_empty()
    || input.resting_place.trim().is_empty()
  {
    return Err(ApiError::BadRequest(
      "full_name and resting_place are required".to_string(),
    ));
  }

  let (memorial, validation) = Memorial::create(input, Utc::now());
  state
    .store
    .put(&memorial)
    .await
    .map_err(ApiError::from_store)?;
  info!(id = %memorial.id, validated = memorial.validated, "memorial created");

  let response = CreatedMemorial {
    view_path: format!("/memorials/{}", memorial.id),
    id:        memorial.id,
    validated: memorial.validated,
    errors:    validation.errors,
  };
  Ok((StatusCode::CREATED, Json(response)))
}

// ─── View ────────────────────────────────────────────────────────────────────

/// `GET /api/memorials/:id`
pub async fn get_one<S, Q>(
  State(state): State<AppState<S, Q>>,
  Path(id): Path<String>,
) -> Result<Json<Memorial>, ApiError>
where
  S: RecordStore,
  Q: Submitter,
{
  let id = MemorialId::from(id);
  state
    .store
    .get(&id)
    .await
    .map_err(ApiError::from_store)?
    .map(Json)
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "memorial {id} not found; records are kept in the store of the \
         device that created them, so this link may only work there"
      ))
    })
}

// ─── QR-code request ─────────────────────────────────────────────────────────

/// `POST /api/memorials/:id/qr-requests`
pub async fn request_qr<S, Q>(
  State(state): State<AppState<S, Q>>,
  Path(id): Path<String>,
  Json(requester): Json<Requester>,
) -> Result<Json<SubmissionOutcome>, ApiError>
where
  S: RecordStore,
  Q: Submitter,
{
  let id = MemorialId::from(id);
  let memorial = state
    .store
    .get(&id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("memorial {id} not found")))?;

  let memorial_url = state.config.memorial_url(&id);
  let outcome = state
    .submitter
    .submit(&memorial, &requester, &memorial_url)
    .await?;
  info!(id = %id, failed = outcome.is_failed(), "qr-code request finished");

  Ok(Json(outcome))
}
