use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use crate::config::AppPaths;
use crate::domain::{Entry, normalize_record};

/// Fixed key the whole entry collection lives under, one JSON array per slot.
pub const ENTRIES_KEY: &str = "finflow.entries.v1";

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(paths: &AppPaths) -> Result<(Self, PathBuf)> {
        fs::create_dir_all(&paths.data_dir)
            .with_context(|| format!("Failed to create data dir {}", paths.data_dir.display()))?;

        let db_path = paths.data_dir.join("finflow.sqlite3");
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open DB {}", db_path.display()))?;

        let store = Self { conn };
        store.migrate()?;
        Ok((store, db_path))
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Loads the entry collection, repairing what it can.
    ///
    /// A missing slot, unparsable JSON, or a non-array payload all load as an
    /// empty collection rather than an error. Individual records failing
    /// normalization are dropped, and duplicate ids keep their first
    /// occurrence so the id-uniqueness invariant holds in memory.
    pub fn load_entries(&self, now: DateTime<Utc>) -> Result<Vec<Entry>> {
        let Some(raw) = self.get(ENTRIES_KEY)? else {
            return Ok(Vec::new());
        };

        let Ok(Value::Array(records)) = serde_json::from_str(&raw) else {
            return Ok(Vec::new());
        };

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for record in &records {
            if let Some(entry) = normalize_record(record, now) {
                if seen.insert(entry.id.clone()) {
                    entries.push(entry);
                }
            }
        }
        Ok(entries)
    }

    /// Replaces the whole persisted collection. The single write path for
    /// every mutation (add, delete, set-category, clear, import).
    pub fn save_entries(&self, entries: &[Entry]) -> Result<()> {
        let json = serde_json::to_string(entries)?;
        self.set(ENTRIES_KEY, &json)
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        Ok(Some(row.get(0)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }
}
