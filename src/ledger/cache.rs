//! SQLite cache of ledger lookups, one row per PNU.

use crate::error::LedgerError;
use crate::model::LedgerLookup;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS ledger_cache (
        pnu TEXT PRIMARY KEY,
        payload_json TEXT NOT NULL,
        fetched_at TEXT NOT NULL
    )";

pub struct LedgerCache {
    conn: Connection,
}

/// Timestamps without an offset are taken as UTC.
fn parse_fetched_at(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

impl LedgerCache {
    /// Open (or create) the cache file, creating parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LedgerError::CacheDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, LedgerError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, LedgerError> {
        conn.execute(SCHEMA, [])?;
        Ok(Self { conn })
    }

    /// Cached lookup for `pnu` unless it is older than `ttl_days`.
    pub fn get(&self, pnu: &str, ttl_days: i64) -> Result<Option<LedgerLookup>, LedgerError> {
        self.get_at(pnu, ttl_days, Utc::now())
    }

    /// [`get`](Self::get) with an explicit clock.
    pub fn get_at(
        &self,
        pnu: &str,
        ttl_days: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<LedgerLookup>, LedgerError> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT payload_json, fetched_at FROM ledger_cache WHERE pnu = ?1",
                params![pnu],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((payload, fetched_at)) = row else {
            return Ok(None);
        };

        let Some(fetched) = parse_fetched_at(&fetched_at) else {
            warn!(pnu, fetched_at = %fetched_at, "unreadable cache timestamp, treating as miss");
            return Ok(None);
        };
        if fetched + Duration::days(ttl_days) < now {
            debug!(pnu, "cache entry expired");
            return Ok(None);
        }

        match serde_json::from_str(&payload) {
            Ok(lookup) => Ok(Some(lookup)),
            Err(e) => {
                warn!(pnu, error = %e, "unreadable cache payload, treating as miss");
                Ok(None)
            }
        }
    }

    /// Store `lookup` for `pnu`, replacing any previous entry.
    pub fn set(&self, pnu: &str, lookup: &LedgerLookup) -> Result<(), LedgerError> {
        self.set_at(pnu, lookup, Utc::now())
    }

    pub fn set_at(
        &self,
        pnu: &str,
        lookup: &LedgerLookup,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let payload = serde_json::to_string(lookup)?;
        self.conn.execute(
            "INSERT INTO ledger_cache (pnu, payload_json, fetched_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(pnu) DO UPDATE SET
                 payload_json = excluded.payload_json,
                 fetched_at = excluded.fetched_at",
            params![pnu, payload, fetched_at.to_rfc3339()],
        )?;
        debug!(pnu, "cached ledger lookup");
        Ok(())
    }
}
