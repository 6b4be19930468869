//! Error type for `everkeep-store`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Both persistence tiers failed. The only fatal path in the store;
  /// surfaced to the user with actionable text.
  #[error(
    "no storage tier accepted the record; check private-browsing or \
     restricted-storage modes and try again"
  )]
  StorageUnavailable,

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
