//! Submission — a request for a physical QR code tied to one memorial.
//!
//! A submission is built transiently per submit action, written once to the
//! durable document store, and never read back by this system; a back-office
//! process consumes it out of band.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::memorial::{Memorial, MemorialId};

// ─── Requester ───────────────────────────────────────────────────────────────

/// Contact details of the person requesting the QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
  pub name:  String,
  pub email: String,
  pub phone: String,
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Back-office processing state. This system only ever writes `Pending`;
/// the other states belong to the external consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
  Pending,
  Processing,
  Completed,
}

// ─── Document ────────────────────────────────────────────────────────────────

/// The durable document written for one QR-code request: a read-only
/// snapshot of the memorial's key fields plus the requester's contact
/// details.
///
/// `photo_urls` holds only the blob URLs whose uploads actually succeeded,
/// so `photo_urls.len() <= memorial.photos.len()` always; no URL is ever
/// fabricated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionDocument {
  pub memorial_id:     MemorialId,
  pub memorial_url:    String,
  pub full_name:       String,
  pub resting_place:   String,
  pub born:            NaiveDate,
  pub died:            NaiveDate,
  pub biography:       String,
  pub photo_urls:      Vec<String>,
  pub requester_name:  String,
  pub requester_email: String,
  pub requester_phone: String,
  pub status:          SubmissionStatus,
  /// Assigned at write time, not accepted from the requester.
  pub requested_at:    DateTime<Utc>,
}

impl SubmissionDocument {
  pub fn new(
    memorial: &Memorial,
    requester: &Requester,
    memorial_url: &str,
    photo_urls: Vec<String>,
    requested_at: DateTime<Utc>,
  ) -> Self {
    debug_assert!(photo_urls.len() <= memorial.photos.len());
    Self {
      memorial_id: memorial.id.clone(),
      memorial_url: memorial_url.to_string(),
      full_name: memorial.full_name.clone(),
      resting_place: memorial.resting_place.clone(),
      born: memorial.born,
      died: memorial.died,
      biography: memorial.biography.clone(),
      photo_urls,
      requester_name: requester.name.clone(),
      requester_email: requester.email.clone(),
      requester_phone: requester.phone.clone(),
      status: SubmissionStatus::Pending,
      requested_at,
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
