//! Durable document storage for submissions.

use std::future::Future;

use everkeep_core::submission::SubmissionDocument;
use reqwest::Client;
use serde::Deserialize;

use crate::error::TransportError;

/// Abstraction over the structured store that receives one document per
/// QR-code request. Write-only from this system's perspective; the
/// back-office consumer reads it elsewhere.
pub trait DocumentStore: Send + Sync {
  /// Persist `doc` and return the store-assigned document id.
  fn add_submission<'a>(
    &'a self,
    doc: &'a SubmissionDocument,
  ) -> impl Future<Output = Result<String, TransportError>> + Send + 'a;
}

// ─── HTTP implementation ─────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CreatedDocument {
  id: String,
}

/// A document store behind a JSON collection endpoint: POST the document,
/// read back `{"id": ...}`.
#[derive(Clone)]
pub struct HttpDocumentStore {
  client:         Client,
  collection_url: String,
}

impl HttpDocumentStore {
  pub fn new(client: Client, collection_url: impl Into<String>) -> Self {
    Self { client, collection_url: collection_url.into() }
  }
}

impl DocumentStore for HttpDocumentStore {
  async fn add_submission(
    &self,
    doc: &SubmissionDocument,
  ) -> Result<String, TransportError> {
    let resp = self
      .client
      .post(&self.collection_url)
      .json(doc)
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(TransportError(format!(
        "document write → {}",
        resp.status()
      )));
    }

    let created: CreatedDocument = resp.json().await?;
    Ok(created.id)
  }
}
