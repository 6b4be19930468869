//! Two-tier local persistence for memorial records.
//!
//! Some environments block or silently no-op the durable tier, so every
//! write goes through a primary-then-secondary fallback with a mandatory
//! read-after-write verification. The SQLite primary tier wraps
//! [`tokio_rusqlite`] so database access runs on a dedicated thread without
//! blocking the async runtime; the secondary tier is a session-scoped
//! in-memory map.

mod memory;
mod schema;
mod sqlite;
mod tier;
mod tiered;

pub mod error;

pub use error::{Error, Result};
pub use memory::MemoryTier;
pub use sqlite::SqliteTier;
pub use tier::StorageTier;
pub use tiered::TieredStore;
