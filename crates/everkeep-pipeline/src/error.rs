//! Error types for `everkeep-pipeline`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The re-entrancy guard refused a second execution while one is in
  /// flight for this pipeline instance.
  #[error("a submission is already in progress")]
  SubmissionInFlight,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A failure talking to one of the outbound collaborators (blob store,
/// document store, templated transport).
///
/// The pipeline only ever logs these and moves to the next fallback, so
/// one stringly-typed error covers all three seams.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
  fn from(e: reqwest::Error) -> Self {
    Self(e.to_string())
  }
}
