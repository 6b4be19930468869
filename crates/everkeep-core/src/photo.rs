//! The photo Encoder — a self-contained data-URI round trip.
//!
//! Photos travel through the system as `data:<mime>;base64,<payload>`
//! strings so a record is a single JSON document with no side files. The
//! encoding is implemented here rather than relying on any runtime-provided
//! decoder, so it is portable and testable in isolation.

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Product cap on the photo gallery. Pushes beyond this are dropped, not
/// rejected.
pub const MAX_PHOTOS: usize = 10;

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum DecodeError {
  #[error("not a data URI (missing `data:` prefix)")]
  MissingPrefix,

  #[error("data URI has no base64 payload separator")]
  MissingPayload,

  #[error("invalid base64 payload: {0}")]
  Base64(#[from] base64::DecodeError),
}

// ─── Encode / decode ─────────────────────────────────────────────────────────

/// Encode raw bytes as a self-describing data URI.
///
/// Deterministic and reversible; has no failure mode for valid input.
pub fn encode(bytes: &[u8], media_type: &str) -> String {
  format!("data:{media_type};base64,{}", B64.encode(bytes))
}

/// A decoded photo: the declared media type plus the raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPhoto {
  pub media_type: String,
  pub bytes:      Vec<u8>,
}

/// Decode a data URI produced by [`encode`] (or by any conforming client).
pub fn decode(uri: &str) -> Result<DecodedPhoto, DecodeError> {
  let rest = uri.strip_prefix("data:").ok_or(DecodeError::MissingPrefix)?;
  let (header, payload) =
    rest.split_once(',').ok_or(DecodeError::MissingPayload)?;
  let media_type = header
    .strip_suffix(";base64")
    .ok_or(DecodeError::MissingPayload)?;

  Ok(DecodedPhoto {
    media_type: media_type.to_string(),
    bytes:      B64.decode(payload)?,
  })
}

// ─── Gallery ─────────────────────────────────────────────────────────────────

/// An ordered gallery of encoded photos, capped at [`MAX_PHOTOS`].
///
/// The cap and the image-only filter are product policy: offending entries
/// are silently dropped rather than raised as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoGallery(Vec<String>);

impl PhotoGallery {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a gallery from already-encoded data URIs. Non-image entries
  /// are dropped, then at most the first [`MAX_PHOTOS`] survivors are
  /// kept — the same policy [`PhotoGallery::add`] applies.
  pub fn from_data_uris(uris: Vec<String>) -> Self {
    let mut uris: Vec<String> = uris
      .into_iter()
      .filter(|uri| uri.starts_with("data:image/"))
      .collect();
    uris.truncate(MAX_PHOTOS);
    Self(uris)
  }

  /// Encode and append one photo. Non-`image/*` media types and pushes
  /// beyond the cap are dropped without error.
  pub fn add(&mut self, bytes: &[u8], media_type: &str) {
    if self.0.len() >= MAX_PHOTOS || !media_type.starts_with("image/") {
      return;
    }
    self.0.push(encode(bytes, media_type));
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.0.iter().map(String::as_str)
  }

  pub fn as_slice(&self) -> &[String] {
    &self.0
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
