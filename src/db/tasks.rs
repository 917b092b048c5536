//! Task store operations.
//!
//! Every mutation that changes observable task state appends a derived entry
//! to the history log. The primary mutation and the audit append are two
//! sequential commits: the task change must be durable before the history
//! write is attempted, and a failed history write does not undo it.

use super::history::record_history;
use super::{now_stamp, Database};
use crate::error::ApiError;
use crate::types::Task;
use anyhow::Result;
use rusqlite::{params, Connection, Row};

fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        text: row.get("text")?,
        status: row.get("status")?,
    })
}

/// Internal helper to get a task using an existing connection.
fn get_task_internal(conn: &Connection, task_id: &str) -> Result<Option<Task>> {
    let mut stmt = conn.prepare("SELECT id, text, status FROM tasks WHERE id = ?1")?;

    let result = stmt.query_row(params![task_id], parse_task_row);

    match result {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl Database {
    /// List all live tasks in storage-native order.
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, text, status FROM tasks")?;

            let tasks = stmt
                .query_map([], parse_task_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(tasks)
        })
    }

    /// Get a task by ID.
    pub fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        self.with_conn(|conn| get_task_internal(conn, task_id))
    }

    /// Create a new task with a caller-assigned id.
    ///
    /// A duplicate id is rejected without mutating state and without writing
    /// a history entry.
    pub fn create_task(&self, id: &str, text: &str, status: &str) -> Result<Task> {
        self.with_conn(|conn| {
            let result = conn.execute(
                "INSERT INTO tasks (id, text, status) VALUES (?1, ?2, ?3)",
                params![id, text, status],
            );

            match result {
                Ok(_) => Ok(Task {
                    id: id.to_string(),
                    text: text.to_string(),
                    status: status.to_string(),
                }),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Err(ApiError::duplicate_id(id).into())
                }
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Update a task's status in place.
    ///
    /// A changed status commits the update, then appends a
    /// `Task "{text}" moved to {status}` history entry as a second commit.
    /// Setting the status it already has succeeds without writing anything.
    pub fn update_status(&self, task_id: &str, new_status: &str) -> Result<Task> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let task = get_task_internal(&tx, task_id)?
                .ok_or_else(|| ApiError::task_not_found(task_id))?;

            if task.status == new_status {
                return Ok(task);
            }

            tx.execute(
                "UPDATE tasks SET status = ?1 WHERE id = ?2",
                params![new_status, task_id],
            )?;
            tx.commit()?;

            let task = Task {
                status: new_status.to_string(),
                ..task
            };

            let action = format!("Task \"{}\" moved to {}", task.text, task.status);
            record_history(conn, &action, &now_stamp())?;

            Ok(task)
        })
    }

    /// Permanently remove a task.
    ///
    /// Appends a `Task "{text}" deleted from {status}` history entry using the
    /// status captured before removal.
    pub fn delete_task(&self, task_id: &str) -> Result<Task> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let task = get_task_internal(&tx, task_id)?
                .ok_or_else(|| ApiError::task_not_found(task_id))?;

            tx.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            tx.commit()?;

            let action = format!("Task \"{}\" deleted from {}", task.text, task.status);
            record_history(conn, &action, &now_stamp())?;

            Ok(task)
        })
    }

    /// Empty both the task store and the history log.
    ///
    /// One transaction, so readers never observe one table cleared and the
    /// other intact.
    pub fn reset(&self) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM tasks", [])?;
            tx.execute("DELETE FROM history", [])?;
            tx.commit()?;
            Ok(())
        })
    }
}
