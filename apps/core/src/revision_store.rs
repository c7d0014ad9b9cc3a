use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid document payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("document '{id}' update conflict: expected revision {expected:?}, stored {current:?}")]
    Conflict {
        id: String,
        expected: Option<String>,
        current: Option<String>,
    },
    #[error("store bind task failed: {0}")]
    Bind(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub revision: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PutRequest {
    pub id: String,
    pub data: serde_json::Value,
    /// `None` only when creating the document.
    pub expected_revision: Option<String>,
}

/// Document persistence with optimistic concurrency on every write.
pub trait DocumentStore: Send {
    fn get(&self, bucket: &str, id: &str) -> Result<Option<StoredDocument>, StoreError>;
    fn put(&self, bucket: &str, request: PutRequest) -> Result<String, StoreError>;
}

pub struct SqliteDocumentStore {
    conn: Connection,
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS documents (
    bucket TEXT NOT NULL,
    id TEXT NOT NULL,
    rev TEXT NOT NULL,
    data TEXT NOT NULL,
    PRIMARY KEY (bucket, id)
)";

impl SqliteDocumentStore {
    pub fn open_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    pub fn open_file(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_from_config(cfg: &Config) -> Result<Self, StoreError> {
        Self::open_file(&cfg.store_path)
    }

    pub fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(SCHEMA, [])?;
        Ok(Self { conn })
    }

    fn current_revision(&self, bucket: &str, id: &str) -> Result<Option<String>, StoreError> {
        let rev = self
            .conn
            .query_row(
                "SELECT rev FROM documents WHERE bucket = ?1 AND id = ?2",
                params![bucket, id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(rev)
    }
}

/// Opens the configured store off the async executor; completes once the schema is ready.
pub async fn bind(path: PathBuf) -> Result<SqliteDocumentStore, StoreError> {
    let handle = tokio::task::spawn_blocking(move || SqliteDocumentStore::open_file(&path));
    match handle.await {
        Ok(result) => result,
        Err(error) => Err(StoreError::Bind(format!("{error:?}"))),
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn get(&self, bucket: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT rev, data FROM documents WHERE bucket = ?1 AND id = ?2",
                params![bucket, id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((revision, raw)) = row else {
            return Ok(None);
        };
        Ok(Some(StoredDocument {
            id: id.to_string(),
            revision,
            data: serde_json::from_str(&raw)?,
        }))
    }

    fn put(&self, bucket: &str, request: PutRequest) -> Result<String, StoreError> {
        let raw = serde_json::to_string(&request.data)?;
        let generation = request
            .expected_revision
            .as_deref()
            .map(revision_generation)
            .unwrap_or(0)
            + 1;
        let next = next_revision(generation, &raw);

        let changed = match request.expected_revision.as_deref() {
            Some(expected) => self.conn.execute(
                "UPDATE documents SET rev = ?1, data = ?2
                 WHERE bucket = ?3 AND id = ?4 AND rev = ?5",
                params![next, raw, bucket, request.id, expected],
            )?,
            None => self.conn.execute(
                "INSERT INTO documents (bucket, id, rev, data) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(bucket, id) DO NOTHING",
                params![bucket, request.id, next, raw],
            )?,
        };

        if changed == 0 {
            let current = self.current_revision(bucket, &request.id)?;
            return Err(StoreError::Conflict {
                id: request.id,
                expected: request.expected_revision,
                current,
            });
        }
        Ok(next)
    }
}

fn revision_generation(revision: &str) -> u64 {
    revision
        .split_once('-')
        .and_then(|(generation, _)| generation.parse().ok())
        .unwrap_or(0)
}

fn next_revision(generation: u64, payload: &str) -> String {
    let mut hasher = DefaultHasher::new();
    generation.hash(&mut hasher);
    payload.hash(&mut hasher);
    format!("{generation}-{:016x}", hasher.finish())
}
