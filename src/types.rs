//! Core domain types shared between the store and the HTTP layer.

use serde::{Deserialize, Serialize};

/// A unit of work with caller-assigned identity, description, and mutable status.
///
/// The id is the primary key and never changes; the text is fixed at creation.
/// Status is a free-form label; any string is valid while the task exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub status: String,
}

/// One immutable audit record.
///
/// The sequence id is store-assigned, monotonic, and never reused; it is kept
/// for ordering but not exposed on the wire (the JSON contract is
/// `{action, timestamp}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(skip_serializing, default)]
    pub id: i64,
    pub action: String,
    pub timestamp: String,
}

/// Ordering for history listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryOrder {
    /// Oldest first, as appended.
    #[default]
    Insertion,
    /// Most recent first.
    Reverse,
}
