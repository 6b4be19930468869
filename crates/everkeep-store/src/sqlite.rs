//! [`SqliteTier`] — the durable primary tier, backed by a single SQLite
//! file.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use crate::{Result, schema::SCHEMA, tier::StorageTier};

/// A key/value tier backed by one SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteTier {
  conn: tokio_rusqlite::Connection,
}

impl SqliteTier {
  /// Open (or create) a tier at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let tier = Self { conn };
    tier.init_schema().await?;
    Ok(tier)
  }

  /// Open an in-memory tier — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let tier = Self { conn };
    tier.init_schema().await?;
    Ok(tier)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl StorageTier for SqliteTier {
  type Error = crate::Error;

  async fn put(&self, key: &str, value: &str) -> Result<()> {
    let key = key.to_owned();
    let value = value.to_owned();
    let stored_at = Utc::now().to_rfc3339();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR REPLACE INTO records (key, value, stored_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![key, value, stored_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get(&self, key: &str) -> Result<Option<String>> {
    let key = key.to_owned();

    let value: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM records WHERE key = ?1",
              rusqlite::params![key],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(value)
  }
}
