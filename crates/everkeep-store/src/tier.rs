//! The `StorageTier` trait — one key/value persistence layer.

use std::future::Future;

/// A single key/value persistence tier holding serialised records.
///
/// Tiers are dumb: they know nothing about records or fallback order. The
/// fallback strategy, including read-after-write verification, lives in
/// [`crate::TieredStore`].
pub trait StorageTier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn put<'a>(
    &'a self,
    key: &'a str,
    value: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;
}
