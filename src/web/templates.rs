//! HTML templates for the history pages.
//!
//! Templates are embedded at compile time using `include_str!`. Handlers
//! substitute the `{{history_entries}}` placeholder with pre-escaped markup.

/// The playback page: video player with the history list overlaid.
pub const PLAYBACK_TEMPLATE: &str = include_str!("templates/playback.html");

/// The full-history page, most recent entry first.
pub const HISTORY_TEMPLATE: &str = include_str!("templates/history.html");
