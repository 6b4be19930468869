//! Error types for `everkeep-core`.

use thiserror::Error;

use crate::photo::DecodeError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed photo payload: {0}")]
  PhotoDecode(#[from] DecodeError),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
