//! Photo blob storage — the durable home for uploaded photo bytes.

use std::future::Future;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::Client;

use crate::error::TransportError;

/// Abstraction over a blob store that accepts photo bytes and returns a
/// retrievable URL.
pub trait PhotoBlobStore: Send + Sync {
  fn upload<'a>(
    &'a self,
    file_name: &'a str,
    media_type: &'a str,
    bytes: Bytes,
  ) -> impl Future<Output = Result<String, TransportError>> + Send + 'a;
}

/// Derive the blob name for one photo: sanitised subject name, 1-based
/// index, and the upload instant in millis. Collision avoidance, not
/// security.
pub fn photo_file_name(
  subject: &str,
  index: usize,
  at: DateTime<Utc>,
) -> String {
  let sanitised: String = subject
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
    .collect();
  format!(
    "{sanitised}_photo_{}_{}.jpg",
    index + 1,
    at.timestamp_millis()
  )
}

// ─── HTTP implementation ─────────────────────────────────────────────────────

/// A blob store speaking plain HTTP PUT: the object lands at
/// `<base_url>/<file_name>` and that same URL is the retrievable one.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpBlobStore {
  client:   Client,
  base_url: String,
}

impl HttpBlobStore {
  pub fn new(client: Client, base_url: impl Into<String>) -> Self {
    let base_url = base_url.into().trim_end_matches('/').to_string();
    Self { client, base_url }
  }
}

impl PhotoBlobStore for HttpBlobStore {
  async fn upload(
    &self,
    file_name: &str,
    media_type: &str,
    bytes: Bytes,
  ) -> Result<String, TransportError> {
    let url = format!("{}/{file_name}", self.base_url);
    let resp = self
      .client
      .put(&url)
      .header(reqwest::header::CONTENT_TYPE, media_type)
      .body(bytes)
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(TransportError(format!(
        "blob upload {file_name} → {}",
        resp.status()
      )));
    }
    Ok(url)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
