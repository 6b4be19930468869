//! [`SubmissionPipeline`] — stage sequencing and outcome classification.

use std::{
  future::Future,
  sync::atomic::{AtomicBool, Ordering},
};

use bytes::Bytes;
use chrono::Utc;
use everkeep_core::{
  memorial::Memorial,
  photo,
  submission::{Requester, SubmissionDocument},
};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
  Error, Result,
  blob::{PhotoBlobStore, photo_file_name},
  document::DocumentStore,
  notify::{Dispatcher, MailtoDraft, NotificationRoute, TemplateTransport,
    render_summary, template_params},
};

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Which leg carried the submission data durably.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveredVia {
  /// The submission document reached the structured store.
  Structured,
  /// The structured store was unreachable; the notification — which
  /// carries the full summary — is the only copy.
  NotificationFallback,
}

/// The result of one submit action, for UI presentation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SubmissionOutcome {
  Delivered {
    via:          DeliveredVia,
    notification: NotificationRoute,
  },
  /// The document was written but with a reduced photo-URL list.
  PartialFailure {
    detail:       String,
    notification: NotificationRoute,
  },
  /// Both the durable write and the notification (including its compose
  /// fallback) failed. The draft is built from whatever data is available
  /// so the caller can still present it.
  Failed { draft: MailtoDraft },
}

impl SubmissionOutcome {
  pub fn is_failed(&self) -> bool {
    matches!(self, Self::Failed { .. })
  }
}

// ─── Submitter trait ─────────────────────────────────────────────────────────

/// Seam for the API layer: anything that can run a submission.
pub trait Submitter: Send + Sync {
  fn submit<'a>(
    &'a self,
    memorial: &'a Memorial,
    requester: &'a Requester,
    memorial_url: &'a str,
  ) -> impl Future<Output = Result<SubmissionOutcome>> + Send + 'a;
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

struct DurableReport {
  document_id: Option<String>,
  photo_urls:  usize,
  attempted:   usize,
}

/// The at-least-once submission pipeline: sequential photo uploads, one
/// durable document write, one human notification — each stage
/// independently fault-tolerant.
pub struct SubmissionPipeline<B, D, T> {
  blobs:      B,
  documents:  D,
  dispatcher: Dispatcher<T>,
  in_flight:  AtomicBool,
}

/// Releases the in-progress flag when the submit call finishes, however it
/// finishes.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
  fn drop(&mut self) {
    self.0.store(false, Ordering::Release);
  }
}

impl<B, D, T> SubmissionPipeline<B, D, T>
where
  B: PhotoBlobStore,
  D: DocumentStore,
  T: TemplateTransport,
{
  pub fn new(blobs: B, documents: D, dispatcher: Dispatcher<T>) -> Self {
    Self {
      blobs,
      documents,
      dispatcher,
      in_flight: AtomicBool::new(false),
    }
  }

  /// Stage 1: upload photos one at a time, then write the submission
  /// document with whichever URLs succeeded. A photo that fails to decode
  /// or upload is skipped, never fatal; a document-store failure marks
  /// the stage failed but is not propagated — the notification stage must
  /// still run.
  async fn durable_write(
    &self,
    memorial: &Memorial,
    requester: &Requester,
    memorial_url: &str,
  ) -> DurableReport {
    let mut photo_urls = Vec::new();

    // Sequential on purpose: bounds memory and spares the upload target.
    for (index, uri) in memorial.photos.iter().enumerate() {
      let decoded = match photo::decode(uri) {
        Ok(d) => d,
        Err(e) => {
          warn!(index, error = %e, "skipping malformed photo");
          continue;
        }
      };

      let file_name =
        photo_file_name(&memorial.full_name, index, Utc::now());
      match self
        .blobs
        .upload(&file_name, &decoded.media_type, Bytes::from(decoded.bytes))
        .await
      {
        Ok(url) => photo_urls.push(url),
        Err(e) => {
          warn!(index, error = %e, "photo upload failed, continuing");
        }
      }
    }

    let attempted = memorial.photos.len();
    let uploaded = photo_urls.len();
    info!(uploaded, attempted, "photo upload stage finished");

    let doc = SubmissionDocument::new(
      memorial,
      requester,
      memorial_url,
      photo_urls,
      Utc::now(),
    );

    let document_id = match self.documents.add_submission(&doc).await {
      Ok(id) => {
        info!(document_id = %id, "submission document written");
        Some(id)
      }
      Err(e) => {
        warn!(error = %e, "durable write failed; continuing to notification");
        None
      }
    };

    DurableReport { document_id, photo_urls: uploaded, attempted }
  }

  /// The last-ditch payload when even the dispatcher errs: addressed to
  /// whatever operator contact exists (possibly none) so the caller can
  /// still show it.
  fn final_fallback_draft(
    &self,
    memorial: &Memorial,
    requester: &Requester,
    memorial_url: &str,
    error: &str,
  ) -> MailtoDraft {
    let body = format!(
      "{}\n\nTECHNICAL ERROR: {error}",
      render_summary(memorial, requester, memorial_url, false)
    );
    let subject = format!("QR code request — {}", memorial.full_name);
    self.dispatcher.compose(&subject, &body)
  }
}

impl<B, D, T> Submitter for SubmissionPipeline<B, D, T>
where
  B: PhotoBlobStore,
  D: DocumentStore,
  T: TemplateTransport,
{
  /// Run one submission to completion. No cancellation: once started, the
  /// pipeline finishes or fails on its own.
  ///
  /// The re-entrancy guard is per pipeline instance, not per memorial id:
  /// a second process holding its own pipeline can still double-submit.
  async fn submit(
    &self,
    memorial: &Memorial,
    requester: &Requester,
    memorial_url: &str,
  ) -> Result<SubmissionOutcome> {
    if self
      .in_flight
      .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
      .is_err()
    {
      return Err(Error::SubmissionInFlight);
    }
    let _guard = InFlightGuard(&self.in_flight);

    // Stage 1 — durable write. Never aborts stage 2.
    let report = self.durable_write(memorial, requester, memorial_url).await;
    let durable_saved = report.document_id.is_some();

    // Stage 2 — notification.
    let subject = format!("QR code request — {}", memorial.full_name);
    let body =
      render_summary(memorial, requester, memorial_url, durable_saved);
    let params = template_params(
      memorial,
      requester,
      memorial_url,
      self.dispatcher.operator_email(),
    );
    let notification =
      self.dispatcher.dispatch(&params, &subject, &body).await;

    // Stage 3 — classification.
    let outcome = match (durable_saved, notification) {
      (true, Ok(notification)) => {
        if report.photo_urls < report.attempted {
          SubmissionOutcome::PartialFailure {
            detail: format!(
              "{} of {} photo uploads failed; the submission document \
               carries the {} that succeeded",
              report.attempted - report.photo_urls,
              report.attempted,
              report.photo_urls,
            ),
            notification,
          }
        } else {
          SubmissionOutcome::Delivered {
            via: DeliveredVia::Structured,
            notification,
          }
        }
      }
      (false, Ok(notification)) => SubmissionOutcome::Delivered {
        via: DeliveredVia::NotificationFallback,
        notification,
      },
      (true, Err(e)) => {
        // The data is durably stored; losing the notification alone is
        // not a user-facing failure.
        warn!(error = %e, "notification failed after durable write");
        SubmissionOutcome::Delivered {
          via:          DeliveredVia::Structured,
          notification: NotificationRoute::Compose(
            self.final_fallback_draft(
              memorial,
              requester,
              memorial_url,
              &e.to_string(),
            ),
          ),
        }
      }
      (false, Err(e)) => SubmissionOutcome::Failed {
        draft: self.final_fallback_draft(
          memorial,
          requester,
          memorial_url,
          &e.to_string(),
        ),
      },
    };

    Ok(outcome)
  }
}
