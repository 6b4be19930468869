//! End-to-end pipeline tests against in-memory collaborator fakes.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicUsize, Ordering},
};

use bytes::Bytes;
use chrono::NaiveDate;
use everkeep_core::{
  memorial::{Details, Memorial, MemorialId},
  photo::{self, PhotoGallery},
  submission::{Requester, SubmissionDocument, SubmissionStatus},
};
use tokio::sync::Notify;

use crate::{
  DeliveredVia, Error, SubmissionOutcome, SubmissionPipeline, Submitter,
  TransportError,
  blob::PhotoBlobStore,
  document::DocumentStore,
  notify::{Dispatcher, NotificationRoute, TemplateParams, TemplateTransport},
};

const MEMORIAL_URL: &str = "https://everkeep.example/memorials/1700000000000";
const OPERATOR: &str = "operator@example.com";

fn memorial(photos: Vec<String>) -> Memorial {
  Memorial {
    id:            MemorialId::from("1700000000000".to_string()),
    full_name:     "Maria de Souza".into(),
    resting_place: "Jardim da Saudade".into(),
    born:          NaiveDate::from_ymd_opt(1938, 3, 2).unwrap(),
    died:          NaiveDate::from_ymd_opt(2021, 9, 14).unwrap(),
    biography:     "Uma vida inteira dedicada à família.".into(),
    photos:        PhotoGallery::from_data_uris(photos),
    details:       Details::default(),
    validated:     true,
  }
}

fn photos(n: usize) -> Vec<String> {
  (0..n).map(|i| photo::encode(&[i as u8; 4], "image/jpeg")).collect()
}

fn requester() -> Requester {
  Requester {
    name:  "Carlos Souza".into(),
    email: "carlos@example.com".into(),
    phone: "(11) 99999-9999".into(),
  }
}

// ─── Collaborator fakes ──────────────────────────────────────────────────────

/// Blob store that can be told to fail specific uploads (by call order).
#[derive(Clone, Default)]
struct FakeBlobStore {
  fail_calls: Vec<usize>,
  calls:      Arc<AtomicUsize>,
}

impl FakeBlobStore {
  fn failing_on(fail_calls: Vec<usize>) -> Self {
    Self { fail_calls, ..Default::default() }
  }
}

impl PhotoBlobStore for FakeBlobStore {
  async fn upload(
    &self,
    file_name: &str,
    _media_type: &str,
    _bytes: Bytes,
  ) -> Result<String, TransportError> {
    let call = self.calls.fetch_add(1, Ordering::SeqCst);
    if self.fail_calls.contains(&call) {
      return Err(TransportError("simulated upload failure".into()));
    }
    Ok(format!("https://blobs.example/{file_name}"))
  }
}

/// Blob store that parks until released, to hold a submission in flight.
#[derive(Clone, Default)]
struct BlockingBlobStore {
  entered: Arc<Notify>,
  release: Arc<Notify>,
}

impl PhotoBlobStore for BlockingBlobStore {
  async fn upload(
    &self,
    file_name: &str,
    _media_type: &str,
    _bytes: Bytes,
  ) -> Result<String, TransportError> {
    self.entered.notify_one();
    self.release.notified().await;
    Ok(format!("https://blobs.example/{file_name}"))
  }
}

#[derive(Clone, Default)]
struct FakeDocumentStore {
  fail: bool,
  docs: Arc<Mutex<Vec<SubmissionDocument>>>,
}

impl FakeDocumentStore {
  fn failing() -> Self {
    Self { fail: true, ..Default::default() }
  }

  fn stored(&self) -> Vec<SubmissionDocument> {
    self.docs.lock().unwrap().clone()
  }
}

impl DocumentStore for FakeDocumentStore {
  async fn add_submission(
    &self,
    doc: &SubmissionDocument,
  ) -> Result<String, TransportError> {
    if self.fail {
      return Err(TransportError("simulated document-store outage".into()));
    }
    let mut docs = self.docs.lock().unwrap();
    docs.push(doc.clone());
    Ok(format!("doc-{}", docs.len()))
  }
}

#[derive(Clone, Default)]
struct FakeTransport {
  fail: bool,
  sent: Arc<AtomicUsize>,
}

impl FakeTransport {
  fn failing() -> Self {
    Self { fail: true, ..Default::default() }
  }

  fn sent_count(&self) -> usize {
    self.sent.load(Ordering::SeqCst)
  }
}

impl TemplateTransport for FakeTransport {
  async fn send(
    &self,
    _params: &TemplateParams,
  ) -> Result<(), TransportError> {
    self.sent.fetch_add(1, Ordering::SeqCst);
    if self.fail {
      return Err(TransportError("simulated transport failure".into()));
    }
    Ok(())
  }
}

// ─── Healthy path ────────────────────────────────────────────────────────────

#[tokio::test]
async fn healthy_submit_delivers_via_structured_store() {
  let documents = FakeDocumentStore::default();
  let transport = FakeTransport::default();
  let pipeline = SubmissionPipeline::new(
    FakeBlobStore::default(),
    documents.clone(),
    Dispatcher::new(Some(transport.clone()), OPERATOR),
  );

  let outcome = pipeline
    .submit(&memorial(photos(2)), &requester(), MEMORIAL_URL)
    .await
    .unwrap();

  assert!(matches!(
    outcome,
    SubmissionOutcome::Delivered {
      via: DeliveredVia::Structured,
      notification: NotificationRoute::Templated,
    }
  ));
  assert_eq!(transport.sent_count(), 1);

  let docs = documents.stored();
  assert_eq!(docs.len(), 1);
  let doc = &docs[0];
  assert_eq!(doc.photo_urls.len(), 2);
  assert_eq!(doc.status, SubmissionStatus::Pending);
  assert_eq!(doc.requester_email, "carlos@example.com");
  assert_eq!(doc.memorial_url, MEMORIAL_URL);
  assert!(doc.photo_urls[0].contains("Maria_de_Souza_photo_1_"));
}

// ─── Per-photo fault tolerance ───────────────────────────────────────────────

#[tokio::test]
async fn failed_upload_is_skipped_and_url_list_reduced() {
  let documents = FakeDocumentStore::default();
  let pipeline = SubmissionPipeline::new(
    FakeBlobStore::failing_on(vec![1]),
    documents.clone(),
    Dispatcher::new(Some(FakeTransport::default()), OPERATOR),
  );

  let outcome = pipeline
    .submit(&memorial(photos(2)), &requester(), MEMORIAL_URL)
    .await
    .unwrap();

  // The document carries exactly the one URL that succeeded.
  let docs = documents.stored();
  assert_eq!(docs.len(), 1);
  assert_eq!(docs[0].photo_urls.len(), 1);
  assert!(docs[0].photo_urls[0].contains("_photo_1_"));

  assert!(!outcome.is_failed());
  assert!(matches!(
    outcome,
    SubmissionOutcome::PartialFailure { ref detail, .. }
      if detail.contains("1 of 2")
  ));
}

#[tokio::test]
async fn malformed_photo_is_skipped_not_fatal() {
  let documents = FakeDocumentStore::default();
  let pipeline = SubmissionPipeline::new(
    FakeBlobStore::default(),
    documents.clone(),
    Dispatcher::new(Some(FakeTransport::default()), OPERATOR),
  );

  let mut uris = vec!["data:image/jpeg".to_string()];
  uris.extend(photos(1));
  let outcome = pipeline
    .submit(&memorial(uris), &requester(), MEMORIAL_URL)
    .await
    .unwrap();

  assert!(!outcome.is_failed());
  assert_eq!(documents.stored()[0].photo_urls.len(), 1);
}

// ─── Notification routing ────────────────────────────────────────────────────

#[tokio::test]
async fn unconfigured_transport_goes_straight_to_compose() {
  let pipeline = SubmissionPipeline::new(
    FakeBlobStore::default(),
    FakeDocumentStore::default(),
    Dispatcher::<FakeTransport>::new(None, OPERATOR),
  );

  let outcome = pipeline
    .submit(&memorial(photos(1)), &requester(), MEMORIAL_URL)
    .await
    .unwrap();

  // Exactly one compose draft, addressed to the operator; the templated
  // transport does not exist to be called.
  match outcome {
    SubmissionOutcome::Delivered {
      via: DeliveredVia::Structured,
      notification: NotificationRoute::Compose(draft),
    } => {
      assert_eq!(draft.to, OPERATOR);
      assert!(draft.subject.contains("Maria de Souza"));
      assert!(draft.body.contains("Carlos Souza"));
      assert!(draft.body.contains(MEMORIAL_URL));
    }
    other => panic!("expected compose delivery, got {other:?}"),
  }
}

#[tokio::test]
async fn transport_failure_falls_back_to_compose() {
  let transport = FakeTransport::failing();
  let pipeline = SubmissionPipeline::new(
    FakeBlobStore::default(),
    FakeDocumentStore::default(),
    Dispatcher::new(Some(transport.clone()), OPERATOR),
  );

  let outcome = pipeline
    .submit(&memorial(photos(1)), &requester(), MEMORIAL_URL)
    .await
    .unwrap();

  assert_eq!(transport.sent_count(), 1);
  assert!(matches!(
    outcome,
    SubmissionOutcome::Delivered {
      notification: NotificationRoute::Compose(_),
      ..
    }
  ));
}

// ─── Durable-store outage ────────────────────────────────────────────────────

#[tokio::test]
async fn document_store_outage_never_blocks_notification() {
  let transport = FakeTransport::default();
  let pipeline = SubmissionPipeline::new(
    FakeBlobStore::default(),
    FakeDocumentStore::failing(),
    Dispatcher::new(Some(transport.clone()), OPERATOR),
  );

  let outcome = pipeline
    .submit(&memorial(photos(1)), &requester(), MEMORIAL_URL)
    .await
    .unwrap();

  assert_eq!(transport.sent_count(), 1);
  assert!(matches!(
    outcome,
    SubmissionOutcome::Delivered {
      via: DeliveredVia::NotificationFallback,
      notification: NotificationRoute::Templated,
    }
  ));
}

#[tokio::test]
async fn everything_dead_yields_failed_with_presentable_draft() {
  // Durable store down, transport down, and no operator contact to
  // address a compose draft to.
  let pipeline = SubmissionPipeline::new(
    FakeBlobStore::default(),
    FakeDocumentStore::failing(),
    Dispatcher::new(Some(FakeTransport::failing()), ""),
  );

  let outcome = pipeline
    .submit(&memorial(photos(1)), &requester(), MEMORIAL_URL)
    .await
    .unwrap();

  match outcome {
    SubmissionOutcome::Failed { draft } => {
      assert!(draft.body.contains("Carlos Souza"));
      assert!(draft.body.contains("TECHNICAL ERROR"));
    }
    other => panic!("expected Failed, got {other:?}"),
  }
}

// ─── Re-entrancy guard ───────────────────────────────────────────────────────

#[tokio::test]
async fn second_submit_is_refused_while_one_is_in_flight() {
  let blobs = BlockingBlobStore::default();
  let pipeline = Arc::new(SubmissionPipeline::new(
    blobs.clone(),
    FakeDocumentStore::default(),
    Dispatcher::new(Some(FakeTransport::default()), OPERATOR),
  ));

  let running = {
    let pipeline = Arc::clone(&pipeline);
    tokio::spawn(async move {
      pipeline
        .submit(&memorial(photos(1)), &requester(), MEMORIAL_URL)
        .await
    })
  };

  // Wait until the first submission is provably inside stage 1.
  blobs.entered.notified().await;

  let err = pipeline
    .submit(&memorial(photos(1)), &requester(), MEMORIAL_URL)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SubmissionInFlight));

  // Let the first run finish; the guard must release.
  blobs.release.notify_one();
  assert!(running.await.unwrap().is_ok());

  // Pre-store a permit so the third run's upload does not park.
  blobs.release.notify_one();
  let again = pipeline
    .submit(&memorial(photos(1)), &requester(), MEMORIAL_URL)
    .await;
  assert!(again.is_ok());
}
