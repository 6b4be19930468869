//! The `RecordStore` trait.
//!
//! The trait is implemented by storage backends (e.g. the tiered store in
//! `everkeep-store`). Higher layers (`everkeep-api`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::memorial::{Memorial, MemorialId};

/// Abstraction over a memorial record store.
///
/// Records are written exactly once at creation, keyed by `memorial.id`,
/// and never updated or deleted. `get` returns `Ok(None)` when the key is
/// unknown; genuine storage failures come back as `Self::Error`.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a newly created memorial under its own id.
  fn put(
    &self,
    memorial: &Memorial,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Retrieve a memorial by id. Returns `None` if not found.
  fn get<'a>(
    &'a self,
    id: &'a MemorialId,
  ) -> impl Future<Output = Result<Option<Memorial>, Self::Error>> + Send + 'a;
}
