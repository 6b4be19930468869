//! Memorial — the record entity created by the author.
//!
//! A memorial is written exactly once, read many times, and never updated
//! in place. Its `validated` flag is computed at creation and stored; it is
//! not recomputed on later reads.

use chrono::{DateTime, Datelike as _, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  photo::PhotoGallery,
  validate::{Validation, validate},
};

// ─── Identity ────────────────────────────────────────────────────────────────

/// Opaque memorial identifier: the unix-epoch milliseconds of the creation
/// instant, as a string.
///
/// Time-based and monotonic-enough for this product's volume; not
/// guaranteed globally unique. Used as the storage key and as part of the
/// public view path.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MemorialId(String);

impl MemorialId {
  pub fn generate(at: DateTime<Utc>) -> Self {
    Self(at.timestamp_millis().to_string())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl From<String> for MemorialId {
  fn from(s: String) -> Self {
    Self(s)
  }
}

impl std::fmt::Display for MemorialId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Optional details ────────────────────────────────────────────────────────

/// The seven optional free-text fields of a memorial.
///
/// Absence is a first-class state: absent fields are omitted from the
/// serialised form entirely, never written as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Details {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub occupation:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub religion:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub hobbies:       Option<String>,
  /// Notable traits and qualities.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub qualities:     Option<String>,
  /// Way of being; how the person carried themselves.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub demeanor:      Option<String>,
  /// Frequently-said phrases.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phrases:       Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub other_details: Option<String>,
}

impl Details {
  /// Total number of optional fields.
  pub const FIELD_COUNT: usize = 7;

  /// How many fields are present and non-empty after trimming.
  pub fn filled_count(&self) -> usize {
    [
      &self.occupation,
      &self.religion,
      &self.hobbies,
      &self.qualities,
      &self.demeanor,
      &self.phrases,
      &self.other_details,
    ]
    .into_iter()
    .filter(|f| f.as_deref().is_some_and(|s| !s.trim().is_empty()))
    .count()
  }
}

// ─── Memorial ────────────────────────────────────────────────────────────────

/// One memorial record. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memorial {
  pub id:            MemorialId,
  pub full_name:     String,
  pub resting_place: String,
  pub born:          NaiveDate,
  pub died:          NaiveDate,
  pub biography:     String,
  pub photos:        PhotoGallery,
  #[serde(flatten)]
  pub details:       Details,
  /// Completeness flag, computed once at creation from [`validate`].
  pub validated:     bool,
}

impl Memorial {
  /// Age at death as a difference of calendar years.
  pub fn age_years(&self) -> i32 {
    self.died.year() - self.born.year()
  }
}

// ─── NewMemorial ─────────────────────────────────────────────────────────────

/// Input to memorial creation. The id and the `validated` flag are always
/// assigned by [`Memorial::create`]; they are not accepted from callers.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMemorial {
  pub full_name:     String,
  pub resting_place: String,
  pub born:          NaiveDate,
  pub died:          NaiveDate,
  pub biography:     String,
  #[serde(default)]
  pub photos:        Vec<String>,
  #[serde(flatten)]
  pub details:       Details,
}

impl Memorial {
  /// Allocate an identifier, run the completeness check, and assemble the
  /// record. Returns the validation outcome alongside so the caller can
  /// report the individual rule failures.
  pub fn create(input: NewMemorial, at: DateTime<Utc>) -> (Self, Validation) {
    let mut memorial = Memorial {
      id:            MemorialId::generate(at),
      full_name:     input.full_name,
      resting_place: input.resting_place,
      born:          input.born,
      died:          input.died,
      biography:     input.biography,
      photos:        PhotoGallery::from_data_uris(input.photos),
      details:       input.details,
      validated:     false,
    };
    let validation = validate(&memorial);
    memorial.validated = validation.ok;
    (memorial, validation)
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
