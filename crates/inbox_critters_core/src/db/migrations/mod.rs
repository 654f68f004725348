//! Schema steps for the sorted-thought ledger.
//!
//! # Responsibility
//! - Bring a connection's `sorted_thoughts` table up to the schema this
//!   binary reads and writes.
//! - Refuse files written by a newer build instead of guessing at them.
//!
//! # Invariants
//! - `uuid` is unique, so one orb can be sorted into the ledger only once.
//! - `text` is never blank and `bucket` is one of the four storage keys.
//! - `seq` is the append order that `load_all` replays.
//! - Steps only add schema; ledger rows are never rewritten.

use crate::db::{DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;

/// Ordered `(user_version, sql)` steps.
const LEDGER_STEPS: &[(u32, &str)] = &[(1, include_str!("0001_init.sql"))];

/// Version range a migration run moved through. `from == to` means the
/// file was already current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaChange {
    pub from: u32,
    pub to: u32,
}

/// Returns the ledger schema version this binary writes.
pub fn latest_version() -> u32 {
    LEDGER_STEPS.last().map_or(0, |(version, _)| *version)
}

/// Applies every pending ledger step in one transaction.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<SchemaChange> {
    let from = stored_version(conn)?;
    let to = latest_version();
    if from > to {
        warn!("event=db_migrate module=db status=rejected db_version={from} latest_supported={to}");
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: to,
        });
    }

    let pending: Vec<_> = LEDGER_STEPS
        .iter()
        .filter(|(version, _)| *version > from)
        .collect();
    if pending.is_empty() {
        return Ok(SchemaChange { from, to });
    }

    let tx = conn.transaction()?;
    for (version, sql) in pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
    }
    tx.commit()?;
    info!("event=db_migrate module=db status=ok from_version={from} to_version={to}");
    Ok(SchemaChange { from, to })
}

fn stored_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}
