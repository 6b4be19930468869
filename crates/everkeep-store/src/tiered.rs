//! [`TieredStore`] — primary-then-secondary fallback with read-after-write
//! verification.

use std::future::Future;

use everkeep_core::{
  memorial::{Memorial, MemorialId},
  store::RecordStore,
};
use tracing::warn;

use crate::{Error, Result, tier::StorageTier};

/// The storage key for a memorial id.
fn storage_key(id: &MemorialId) -> String {
  format!("memorial_{id}")
}

/// A record store layered over two [`StorageTier`]s.
///
/// Writes try the primary tier first and verify it by reading the value
/// back: a tier that silently drops writes (restrictive privacy modes do
/// this) is indistinguishable from a healthy one without the read-back. On
/// tier error or verification mismatch the write falls back to the
/// secondary tier; only when both tiers fail does `put` return
/// [`Error::StorageUnavailable`].
///
/// Environments with no usable primary tier construct the store with
/// `primary = None` — the capability check is explicit rather than probed
/// from ambient globals.
#[derive(Clone)]
pub struct TieredStore<P, S> {
  primary:   Option<P>,
  secondary: S,
}

impl<P, S> TieredStore<P, S>
where
  P: StorageTier,
  S: StorageTier,
{
  pub fn new(primary: Option<P>, secondary: S) -> Self {
    Self { primary, secondary }
  }

  /// Write `value`, then read it back and compare. Returns `false` on any
  /// tier error or mismatch (logged, never propagated — the caller moves
  /// on to the next tier).
  async fn put_verified<T: StorageTier>(
    tier: &T,
    tier_name: &str,
    key: &str,
    value: &str,
  ) -> bool {
    if let Err(e) = tier.put(key, value).await {
      warn!(key, tier = tier_name, error = %e, "tier write failed");
      return false;
    }
    match tier.get(key).await {
      Ok(Some(stored)) if stored == value => true,
      Ok(_) => {
        warn!(key, tier = tier_name, "tier write did not verify");
        false
      }
      Err(e) => {
        warn!(key, tier = tier_name, error = %e, "tier read-back failed");
        false
      }
    }
  }

  /// Read `key` from one tier, demoting tier errors to a miss.
  async fn get_lenient<T: StorageTier>(
    tier: &T,
    tier_name: &str,
    key: &str,
  ) -> Option<String> {
    match tier.get(key).await {
      Ok(hit) => hit,
      Err(e) => {
        warn!(key, tier = tier_name, error = %e, "tier read failed");
        None
      }
    }
  }
}

impl<P, S> RecordStore for TieredStore<P, S>
where
  P: StorageTier,
  S: StorageTier,
{
  type Error = Error;

  fn put(
    &self,
    memorial: &Memorial,
  ) -> impl Future<Output = Result<()>> + Send + '_ {
    let key = storage_key(&memorial.id);
    let value = serde_json::to_string(memorial);

    async move {
      let value = value?;

      if let Some(primary) = &self.primary
        && Self::put_verified(primary, "primary", &key, &value).await
      {
        return Ok(());
      }

      if Self::put_verified(&self.secondary, "secondary", &key, &value).await {
        return Ok(());
      }

      Err(Error::StorageUnavailable)
    }
  }

  async fn get(&self, id: &MemorialId) -> Result<Option<Memorial>> {
    let key = storage_key(id);

    let hit = match &self.primary {
      Some(primary) => Self::get_lenient(primary, "primary", &key).await,
      None => None,
    };
    let hit = match hit {
      Some(value) => Some(value),
      None => Self::get_lenient(&self.secondary, "secondary", &key).await,
    };

    hit
      .map(|value| serde_json::from_str(&value))
      .transpose()
      .map_err(Error::Json)
  }
}
