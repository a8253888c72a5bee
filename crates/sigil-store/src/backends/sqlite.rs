use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use sigil_core::{
    AnchorRecord, Attestation, AttestationType, Block, Challenge, Did, EventKind, LedgerEvent,
    LedgerId, Subject,
};

use crate::error::StoreError;
use crate::traits::IdentityStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS subjects (
    did TEXT PRIMARY KEY,
    public_key TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS blocks (
    ledger_id TEXT NOT NULL,
    idx INTEGER NOT NULL,
    timestamp INTEGER NOT NULL,
    event TEXT NOT NULL,
    data TEXT NOT NULL,
    previous_hash TEXT NOT NULL,
    hash TEXT NOT NULL,
    PRIMARY KEY (ledger_id, idx)
);
CREATE TABLE IF NOT EXISTS anchors (
    id TEXT PRIMARY KEY,
    timestamp TEXT NOT NULL,
    latest_hash TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS challenges (
    did TEXT PRIMARY KEY,
    nonce TEXT NOT NULL,
    expiry TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS attestations (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    did TEXT NOT NULL,
    type TEXT NOT NULL,
    payload TEXT NOT NULL,
    issued_at TEXT NOT NULL,
    revoked INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_attestations_did ON attestations(did);
";

/// Relational store on a single SQLite database file.
///
/// Blocks are stored one row per block with the event tag and typed data
/// split into columns; the `(ledger_id, idx)` primary key makes a forked
/// append impossible even for writers outside this process.
///
/// rusqlite is blocking, so every statement runs on the blocking pool.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

type BlockRow = (i64, i64, String, String, String, String);

impl SqliteStore {
    /// Open or create a database file and apply the schema.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Self::with_connection(conn)
    }

    /// A private in-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on a blocking thread.
    async fn call<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|_| StoreError::Backend("sqlite connection lock poisoned".into()))?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("sqlite task failed: {}", e)))?
    }

    fn block_from_row(row: BlockRow) -> Result<Block, StoreError> {
        let (idx, timestamp, event, data, previous_hash, hash) = row;
        let kind: EventKind = event.parse()?;
        let data: serde_json::Value = serde_json::from_str(&data)?;
        let event = LedgerEvent::from_parts(kind, data)?;
        Ok(Block {
            index: idx as u64,
            timestamp,
            event,
            previous_hash,
            hash,
        })
    }

    fn insert_block(conn: &Connection, id: &LedgerId, block: &Block) -> Result<(), StoreError> {
        let data = serde_json::to_string(&block.event.data_json()?)?;
        conn.execute(
            "INSERT INTO blocks (ledger_id, idx, timestamp, event, data, previous_hash, hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id.as_str(),
                block.index as i64,
                block.timestamp,
                block.kind().as_str(),
                data,
                block.previous_hash,
                block.hash,
            ],
        )?;
        Ok(())
    }

    fn ledger_len(conn: &Connection, id: &LedgerId) -> Result<u64, StoreError> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM blocks WHERE ledger_id = ?1",
            params![id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

#[async_trait]
impl IdentityStore for SqliteStore {
    async fn create_subject(&self, subject: &Subject) -> Result<bool, StoreError> {
        let subject = subject.clone();
        self.call(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO subjects (did, public_key, created_at) VALUES (?1, ?2, ?3)",
                params![subject.did.uri(), subject.public_key, subject.created_at],
            )?;
            Ok(inserted == 1)
        })
        .await
    }

    async fn get_subject(&self, did: &Did) -> Result<Option<Subject>, StoreError> {
        let did = did.clone();
        self.call(move |conn| {
            let row = conn
                .query_row(
                    "SELECT public_key, created_at FROM subjects WHERE did = ?1",
                    params![did.uri()],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, DateTime<Utc>>(1)?)),
                )
                .optional()?;
            Ok(row.map(|(public_key, created_at)| Subject {
                did,
                public_key,
                created_at,
            }))
        })
        .await
    }

    async fn create_ledger(&self, id: &LedgerId, genesis: &Block) -> Result<(), StoreError> {
        let (id, genesis) = (id.clone(), genesis.clone());
        self.call(move |conn| {
            let tx = conn.transaction()?;
            if Self::ledger_len(&tx, &id)? > 0 {
                return Err(StoreError::AlreadyExists(id.to_string()));
            }
            Self::insert_block(&tx, &id, &genesis)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn get_ledger(&self, id: &LedgerId) -> Result<Option<Vec<Block>>, StoreError> {
        let id = id.clone();
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT idx, timestamp, event, data, previous_hash, hash
                 FROM blocks WHERE ledger_id = ?1 ORDER BY idx ASC",
            )?;
            let rows = stmt
                .query_map(params![id.as_str()], |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                })?
                .collect::<Result<Vec<BlockRow>, _>>()?;
            if rows.is_empty() {
                return Ok(None);
            }
            let blocks = rows
                .into_iter()
                .map(Self::block_from_row)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(blocks))
        })
        .await
    }

    async fn append_block(&self, id: &LedgerId, block: &Block) -> Result<(), StoreError> {
        let (id, block) = (id.clone(), block.clone());
        self.call(move |conn| {
            let tx = conn.transaction()?;
            let expected = Self::ledger_len(&tx, &id)?;
            if expected == 0 {
                return Err(StoreError::NotFound(id.to_string()));
            }
            if block.index != expected {
                return Err(StoreError::Conflict {
                    id: id.to_string(),
                    expected,
                    actual: block.index,
                });
            }
            Self::insert_block(&tx, &id, &block)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn get_anchor(&self, id: &LedgerId) -> Result<Option<AnchorRecord>, StoreError> {
        let id = id.clone();
        self.call(move |conn| {
            let row = conn
                .query_row(
                    "SELECT timestamp, latest_hash FROM anchors WHERE id = ?1",
                    params![id.as_str()],
                    |row| Ok((row.get::<_, DateTime<Utc>>(0)?, row.get::<_, String>(1)?)),
                )
                .optional()?;
            Ok(row.map(|(timestamp, latest_hash)| AnchorRecord {
                id,
                timestamp,
                latest_hash,
            }))
        })
        .await
    }

    async fn upsert_anchor(&self, record: &AnchorRecord) -> Result<(), StoreError> {
        let record = record.clone();
        self.call(move |conn| {
            conn.execute(
                "INSERT INTO anchors (id, timestamp, latest_hash) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET timestamp = excluded.timestamp,
                                               latest_hash = excluded.latest_hash",
                params![record.id.as_str(), record.timestamp, record.latest_hash],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_challenge(&self, did: &Did) -> Result<Option<Challenge>, StoreError> {
        let did = did.clone();
        self.call(move |conn| {
            let row = conn
                .query_row(
                    "SELECT nonce, expiry FROM challenges WHERE did = ?1",
                    params![did.uri()],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, DateTime<Utc>>(1)?)),
                )
                .optional()?;
            Ok(row.map(|(nonce, expiry)| Challenge { did, nonce, expiry }))
        })
        .await
    }

    async fn set_challenge(&self, challenge: &Challenge) -> Result<(), StoreError> {
        let challenge = challenge.clone();
        self.call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO challenges (did, nonce, expiry) VALUES (?1, ?2, ?3)",
                params![challenge.did.uri(), challenge.nonce, challenge.expiry],
            )?;
            Ok(())
        })
        .await
    }

    async fn delete_challenge(&self, did: &Did) -> Result<(), StoreError> {
        let did = did.clone();
        self.call(move |conn| {
            conn.execute("DELETE FROM challenges WHERE did = ?1", params![did.uri()])?;
            Ok(())
        })
        .await
    }

    async fn list_attestations(&self, did: &Did) -> Result<Vec<Attestation>, StoreError> {
        let did = did.clone();
        self.call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, type, payload, issued_at, revoked
                 FROM attestations WHERE did = ?1 ORDER BY seq ASC",
            )?;
            let rows = stmt
                .query_map(params![did.uri()], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, DateTime<Utc>>(3)?,
                        row.get::<_, bool>(4)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(id, kind, payload, issued_at, revoked)| -> Result<Attestation, StoreError> {
                    let attestation_type: AttestationType = kind.parse()?;
                    Ok(Attestation {
                        id,
                        attestation_type,
                        payload: serde_json::from_str(&payload)?,
                        issued_at,
                        revoked,
                    })
                })
                .collect()
        })
        .await
    }

    async fn append_attestation(
        &self,
        did: &Did,
        attestation: &Attestation,
    ) -> Result<(), StoreError> {
        let (did, attestation) = (did.clone(), attestation.clone());
        self.call(move |conn| {
            conn.execute(
                "INSERT INTO attestations (id, did, type, payload, issued_at, revoked)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    attestation.id,
                    did.uri(),
                    attestation.attestation_type.as_str(),
                    serde_json::to_string(&attestation.payload)?,
                    attestation.issued_at,
                    attestation.revoked,
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn set_attestation_revoked(
        &self,
        did: &Did,
        attestation_id: &str,
    ) -> Result<bool, StoreError> {
        let (did, attestation_id) = (did.clone(), attestation_id.to_string());
        self.call(move |conn| {
            let updated = conn.execute(
                "UPDATE attestations SET revoked = 1 WHERE did = ?1 AND id = ?2",
                params![did.uri(), attestation_id],
            )?;
            Ok(updated > 0)
        })
        .await
    }
}
