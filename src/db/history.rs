//! History log operations.
//!
//! The log is append-only: entries are never mutated or removed except by the
//! global reset. Sequence ids are assigned by the store and never reused.

use super::Database;
use crate::types::{HistoryEntry, HistoryOrder};
use anyhow::Result;
use rusqlite::{params, Connection, Row};

fn parse_history_row(row: &Row) -> rusqlite::Result<HistoryEntry> {
    Ok(HistoryEntry {
        id: row.get("id")?,
        action: row.get("action")?,
        timestamp: row.get("timestamp")?,
    })
}

/// Record one history entry using an existing connection.
///
/// Task mutations call this after their own commit, so the audit write is a
/// separate transactional step that cannot undo the primary mutation.
pub(crate) fn record_history(
    conn: &Connection,
    action: &str,
    timestamp: &str,
) -> Result<HistoryEntry> {
    conn.execute(
        "INSERT INTO history (action, timestamp) VALUES (?1, ?2)",
        params![action, timestamp],
    )?;

    Ok(HistoryEntry {
        id: conn.last_insert_rowid(),
        action: action.to_string(),
        timestamp: timestamp.to_string(),
    })
}

impl Database {
    /// List all history entries in the requested order. Full scan, no
    /// pagination.
    pub fn list_history(&self, order: HistoryOrder) -> Result<Vec<HistoryEntry>> {
        let sql = match order {
            HistoryOrder::Insertion => {
                "SELECT id, action, timestamp FROM history ORDER BY id ASC"
            }
            HistoryOrder::Reverse => "SELECT id, action, timestamp FROM history ORDER BY id DESC",
        };

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;

            let entries = stmt
                .query_map([], parse_history_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(entries)
        })
    }

    /// Append one entry to the history log.
    ///
    /// The timestamp is stored as given: internal callers pass a freshly
    /// generated stamp, the direct append path passes the caller's string
    /// through unvalidated.
    pub fn append_history(&self, action: &str, timestamp: &str) -> Result<HistoryEntry> {
        self.with_conn(|conn| record_history(conn, action, timestamp))
    }
}
