//! SQL schema for the SQLite primary tier.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per record. Records are written once and never updated;
-- `INSERT OR REPLACE` only matters for a retried write of the same value.
CREATE TABLE IF NOT EXISTS records (
    key       TEXT PRIMARY KEY,
    value     TEXT NOT NULL,   -- serialised record JSON
    stored_at TEXT NOT NULL    -- ISO 8601 UTC
);

PRAGMA user_version = 1;
";
