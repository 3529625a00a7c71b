//! SQLite gateway.
//!
//! ```text
//! tiddler           (id PK, title UNIQUE, body, modifier, tags, version, modified_ms)
//! tiddler_revision  (origin_id, version, title, body, modifier, tags, timestamp_ms)
//! ```
//!
//! Ids come from AUTOINCREMENT so a deleted lineage's id is never reused and its
//! revisions stay addressable.

use crate::errors::GatewayResult;
use crate::plan::{plan_save, RowRef, SavePlan};
use crate::port::{
    stored_body, GatewayConfig, PersistencePort, Revision, SaveOutcome, SaveRequest, StoredTiddler,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};
use std::path::Path;
use std::time::Duration;
use tiddly_store::dates::truncate_to_minute;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tiddler (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL UNIQUE,
    body TEXT NOT NULL,
    modifier TEXT NOT NULL,
    tags TEXT NOT NULL,
    version INTEGER NOT NULL,
    modified_ms INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS tiddler_revision (
    origin_id INTEGER NOT NULL,
    version INTEGER NOT NULL,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    modifier TEXT NOT NULL,
    tags TEXT NOT NULL,
    timestamp_ms INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS tiddler_revision_origin ON tiddler_revision(origin_id, version);
"#;

const ROW_COLUMNS: &str = "id, title, body, modifier, tags, version, modified_ms";

#[derive(Debug)]
pub struct SqliteGateway {
    conn: Connection,
    config: GatewayConfig,
}

impl SqliteGateway {
    pub fn open(path: impl AsRef<Path>, config: GatewayConfig) -> GatewayResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        info!(path = %path.display(), "Opened SQLite gateway");
        Self::with_connection(conn, config)
    }

    pub fn open_in_memory(config: GatewayConfig) -> GatewayResult<Self> {
        Self::with_connection(Connection::open_in_memory()?, config)
    }

    fn with_connection(conn: Connection, config: GatewayConfig) -> GatewayResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn, config })
    }
}

fn millis(date: &DateTime<Utc>) -> i64 {
    date.timestamp_millis()
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or_default()
}

fn resolve_tx(tx: &Transaction<'_>, title: &str) -> GatewayResult<Option<RowRef>> {
    Ok(tx
        .query_row(
            "SELECT id, version FROM tiddler WHERE title = ?1",
            params![title],
            |row| {
                Ok(RowRef {
                    id: row.get(0)?,
                    version: row.get::<_, i64>(1)? as u64,
                })
            },
        )
        .optional()?)
}

fn stored_row(row: &Row<'_>) -> rusqlite::Result<StoredTiddler> {
    Ok(StoredTiddler {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        modifier: row.get(3)?,
        tags: row.get(4)?,
        version: row.get::<_, i64>(5)? as u64,
        modified: from_millis(row.get(6)?),
    })
}

impl PersistencePort for SqliteGateway {
    #[instrument(skip(self, request), fields(title = %request.title))]
    fn save(&mut self, request: &SaveRequest) -> GatewayResult<SaveOutcome> {
        let config = self.config;
        let tx = self.conn.transaction()?;

        let old = resolve_tx(&tx, &request.old_title)?;
        let new = if request.is_rename() {
            resolve_tx(&tx, &request.title)?
        } else {
            match old {
                Some(row) => Some(row),
                None => resolve_tx(&tx, &request.title)?,
            }
        };
        let plan = plan_save(request, old, new, &config)?;
        let modified_ms = millis(&truncate_to_minute(Utc::now()));
        let body = stored_body(request);
        let version = plan.version();

        let (id, evicted) = match plan {
            SavePlan::Insert => {
                tx.execute(
                    "INSERT INTO tiddler (title, body, modifier, tags, version, modified_ms) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        request.title,
                        body,
                        request.modifier,
                        request.tags,
                        version as i64,
                        modified_ms
                    ],
                )?;
                (tx.last_insert_rowid(), None)
            }
            SavePlan::Update { id, evict, .. } => {
                if let Some(evict) = evict {
                    tx.execute("DELETE FROM tiddler WHERE id = ?1", params![evict])?;
                    debug!(evicted = evict, "Deleted overwritten row");
                }
                tx.execute(
                    "UPDATE tiddler SET title = ?2, body = ?3, modifier = ?4, tags = ?5, \
                     version = ?6, modified_ms = ?7 WHERE id = ?1",
                    params![
                        id,
                        request.title,
                        body,
                        request.modifier,
                        request.tags,
                        version as i64,
                        modified_ms
                    ],
                )?;
                (id, evict)
            }
        };

        if config.record_history {
            tx.execute(
                "INSERT INTO tiddler_revision \
                 (origin_id, version, title, body, modifier, tags, timestamp_ms) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id,
                    version as i64,
                    request.title,
                    body,
                    request.modifier,
                    request.tags,
                    modified_ms
                ],
            )?;
        }
        tx.commit()?;

        debug!(id, version, "Saved");
        Ok(SaveOutcome { id, version, evicted })
    }

    #[instrument(skip(self))]
    fn delete(&mut self, title: &str) -> GatewayResult<bool> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute("DELETE FROM tiddler WHERE title = ?1", params![title])?;
        tx.commit()?;
        Ok(deleted > 0)
    }

    fn load(&self, title: &str) -> GatewayResult<Option<StoredTiddler>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {ROW_COLUMNS} FROM tiddler WHERE title = ?1"),
                params![title],
                stored_row,
            )
            .optional()?)
    }

    fn rows(&self) -> GatewayResult<Vec<StoredTiddler>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ROW_COLUMNS} FROM tiddler ORDER BY title"))?;
        let rows = stmt
            .query_map([], stored_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn history(&self, origin_id: i64) -> GatewayResult<Vec<Revision>> {
        let mut stmt = self.conn.prepare(
            "SELECT origin_id, version, title, body, modifier, tags, timestamp_ms \
             FROM tiddler_revision WHERE origin_id = ?1 ORDER BY version, rowid",
        )?;
        let revisions = stmt
            .query_map(params![origin_id], |row| {
                Ok(Revision {
                    origin_id: row.get(0)?,
                    version: row.get::<_, i64>(1)? as u64,
                    title: row.get(2)?,
                    body: row.get(3)?,
                    modifier: row.get(4)?,
                    tags: row.get(5)?,
                    timestamp: from_millis(row.get(6)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(revisions)
    }

    fn config(&self) -> GatewayConfig {
        self.config
    }
}
