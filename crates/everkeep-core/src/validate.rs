//! Completeness validation for a memorial.
//!
//! Pure and idempotent; the outcome is stored on the record as the
//! `validated` flag at creation time and never recomputed afterwards.

use crate::memorial::{Details, Memorial};

/// Minimum trimmed biography length, in characters.
pub const MIN_BIOGRAPHY_CHARS: usize = 500;

/// Minimum number of photos.
pub const MIN_PHOTOS: usize = 1;

/// Minimum number of filled optional detail fields.
pub const MIN_DETAILS: usize = 3;

/// The outcome of a completeness check: one human-readable message per
/// failing rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
  pub ok:     bool,
  pub errors: Vec<String>,
}

/// Check a memorial against the completeness rules. All rules must hold
/// for `ok` to be true.
pub fn validate(memorial: &Memorial) -> Validation {
  let mut errors = Vec::new();

  let bio_len = memorial.biography.trim().chars().count();
  if bio_len < MIN_BIOGRAPHY_CHARS {
    errors.push(format!(
      "biography must be at least {MIN_BIOGRAPHY_CHARS} characters \
       (currently {bio_len})"
    ));
  }

  if memorial.photos.len() < MIN_PHOTOS {
    errors.push("at least one photo is required".to_string());
  }

  let filled = memorial.details.filled_count();
  if filled < MIN_DETAILS {
    errors.push(format!(
      "at least {MIN_DETAILS} of the {} optional fields must be filled \
       (currently {filled})",
      Details::FIELD_COUNT
    ));
  }

  Validation { ok: errors.is_empty(), errors }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, Utc};

  use super::*;
  use crate::{
    memorial::{Details, Memorial, MemorialId},
    photo::{self, PhotoGallery},
  };

  fn memorial(
    biography: &str,
    photo_count: usize,
    details: Details,
  ) -> Memorial {
    let uris = (0..photo_count)
      .map(|i| photo::encode(&[i as u8], "image/png"))
      .collect();
    Memorial {
      id:            MemorialId::generate(Utc::now()),
      full_name:     "Maria de Souza".into(),
      resting_place: "Cemitério São João Batista".into(),
      born:          NaiveDate::from_ymd_opt(1938, 3, 2).unwrap(),
      died:          NaiveDate::from_ymd_opt(2021, 9, 14).unwrap(),
      biography:     biography.into(),
      photos:        PhotoGallery::from_data_uris(uris),
      details,
      validated:     false,
    }
  }

  fn three_details() -> Details {
    Details {
      occupation: Some("seamstress".into()),
      religion: Some("catholic".into()),
      hobbies: Some("gardening".into()),
      ..Default::default()
    }
  }

  #[test]
  fn short_biography_error_reports_actual_trimmed_length() {
    let m = memorial("  short life story  ", 1, three_details());
    let v = validate(&m);
    assert!(!v.ok);
    // 16 characters after trimming.
    assert!(
      v.errors.iter().any(|e| e.contains("(currently 16)")),
      "errors: {:?}",
      v.errors
    );
  }

  #[test]
  fn zero_photos_fails_with_photo_error() {
    let m = memorial(&"x".repeat(600), 0, three_details());
    let v = validate(&m);
    assert!(!v.ok);
    assert!(v.errors.iter().any(|e| e.contains("at least one photo")));
  }

  #[test]
  fn detail_rule_fires_iff_fewer_than_three_filled() {
    for n in 0..=Details::FIELD_COUNT {
      let mut details = Details::default();
      let slots: [&mut Option<String>; 7] = [
        &mut details.occupation,
        &mut details.religion,
        &mut details.hobbies,
        &mut details.qualities,
        &mut details.demeanor,
        &mut details.phrases,
        &mut details.other_details,
      ];
      for slot in slots.into_iter().take(n) {
        *slot = Some("filled".into());
      }

      let m = memorial(&"x".repeat(600), 1, details);
      let v = validate(&m);
      let detail_errors: Vec<_> = v
        .errors
        .iter()
        .filter(|e| e.contains("optional fields"))
        .collect();

      if n < MIN_DETAILS {
        assert_eq!(detail_errors.len(), 1, "n = {n}");
        assert!(
          detail_errors[0].contains(&format!("(currently {n})")),
          "n = {n}: {detail_errors:?}"
        );
      } else {
        assert!(detail_errors.is_empty(), "n = {n}");
      }
    }
  }

  #[test]
  fn complete_memorial_validates_with_no_errors() {
    let m = memorial(&"x".repeat(600), 2, three_details());
    let v = validate(&m);
    assert!(v.ok);
    assert!(v.errors.is_empty());
  }

  #[test]
  fn validated_flag_is_set_at_creation() {
    use crate::memorial::NewMemorial;

    let input = NewMemorial {
      full_name:     "João Pereira".into(),
      resting_place: "Jardim da Saudade".into(),
      born:          NaiveDate::from_ymd_opt(1950, 1, 1).unwrap(),
      died:          NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
      biography:     "y".repeat(500),
      photos:        vec![photo::encode(b"px", "image/png")],
      details:       three_details(),
    };
    let (memorial, validation) = Memorial::create(input, Utc::now());
    assert!(validation.ok);
    assert!(memorial.validated);
  }
}
