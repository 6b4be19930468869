//! [`MemoryTier`] — the session-scoped secondary tier.

use std::{
  collections::HashMap,
  convert::Infallible,
  sync::{Arc, Mutex},
};

use crate::tier::StorageTier;

/// An in-memory key/value tier. Non-persistent: contents live exactly as
/// long as the process ("session-scoped" semantics).
///
/// Cloning is cheap — clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryTier {
  entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryTier {
  pub fn new() -> Self {
    Self::default()
  }
}

impl StorageTier for MemoryTier {
  type Error = Infallible;

  async fn put(&self, key: &str, value: &str) -> Result<(), Infallible> {
    // A poisoned lock still holds a usable map; writes here are atomic.
    let mut entries =
      self.entries.lock().unwrap_or_else(|e| e.into_inner());
    entries.insert(key.to_owned(), value.to_owned());
    Ok(())
  }

  async fn get(&self, key: &str) -> Result<Option<String>, Infallible> {
    let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
    Ok(entries.get(key).cloned())
  }
}
