//! Sorted-thought ledger contracts and implementations.
//!
//! # Responsibility
//! - Provide `append` / `load_all` over the `sorted_thoughts` ledger.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - A record ID is appended at most once.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::bucket::Bucket;
use crate::model::orb::OrbId;
use crate::model::thought::SortedThought;
use parking_lot::Mutex;
use rusqlite::{params, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// History store failures.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    DuplicateRecord(OrbId),
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateRecord(id) => write!(f, "sorted thought already recorded: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted sorted thought: {message}")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::DuplicateRecord(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Append-only ledger of completed classifications.
pub trait HistoryStore: Send {
    fn append(&self, thought: &SortedThought) -> StoreResult<()>;
    /// All records, oldest append first.
    fn load_all(&self) -> StoreResult<Vec<SortedThought>>;
}

/// Process-local store. Clones share the same ledger.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHistoryStore {
    records: Arc<Mutex<Vec<SortedThought>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the ledger, e.g. with records from an earlier session.
    pub fn with_records(records: Vec<SortedThought>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn append(&self, thought: &SortedThought) -> StoreResult<()> {
        let mut records = self.records.lock();
        if records.iter().any(|record| record.id == thought.id) {
            return Err(StoreError::DuplicateRecord(thought.id));
        }
        records.push(thought.clone());
        Ok(())
    }

    fn load_all(&self) -> StoreResult<Vec<SortedThought>> {
        Ok(self.records.lock().clone())
    }
}

/// SQLite-backed store owning its connection.
pub struct SqliteHistoryStore {
    conn: Connection,
}

impl SqliteHistoryStore {
    /// Wraps a connection returned by `open_db` / `open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (and migrates) the ledger file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn append(&self, thought: &SortedThought) -> StoreResult<()> {
        let result = self.conn.execute(
            "INSERT INTO sorted_thoughts (uuid, text, bucket, sorted_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                thought.id.to_string(),
                thought.text.as_str(),
                thought.bucket.as_key(),
                thought.timestamp,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation
                    && self.contains(thought.id)? =>
            {
                Err(StoreError::DuplicateRecord(thought.id))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn load_all(&self) -> StoreResult<Vec<SortedThought>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, text, bucket, sorted_at
             FROM sorted_thoughts
             ORDER BY seq ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_thought_row(row)?);
        }
        Ok(records)
    }
}

impl SqliteHistoryStore {
    fn contains(&self, id: OrbId) -> StoreResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sorted_thoughts WHERE uuid = ?1);",
            [id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

fn parse_thought_row(row: &Row<'_>) -> StoreResult<SortedThought> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in sorted_thoughts.uuid"
        ))
    })?;

    let bucket_text: String = row.get("bucket")?;
    let bucket = Bucket::from_key(&bucket_text).ok_or_else(|| {
        StoreError::InvalidData(format!(
            "invalid bucket `{bucket_text}` in sorted_thoughts.bucket"
        ))
    })?;

    Ok(SortedThought {
        id,
        text: row.get("text")?,
        bucket,
        timestamp: row.get("sorted_at")?,
    })
}
