//! Integration tests for the task store and history log.
//!
//! These tests verify the core store operations using an in-memory SQLite
//! database. Tests are organized by component and behavior.

use taskboard::db::Database;
use taskboard::error::{ApiError, ErrorCode};
use taskboard::types::HistoryOrder;

/// Helper to create a fresh in-memory database for testing.
fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

mod task_tests {
    use super::*;

    #[test]
    fn create_task_returns_the_new_task() {
        let db = setup_db();

        let task = db
            .create_task("t1", "Buy milk", "todo")
            .expect("Failed to create task");

        assert_eq!(task.id, "t1");
        assert_eq!(task.text, "Buy milk");
        assert_eq!(task.status, "todo");
    }

    #[test]
    fn list_tasks_shows_created_tasks() {
        let db = setup_db();
        db.create_task("t1", "Buy milk", "todo").unwrap();
        db.create_task("t2", "Walk dog", "in-progress").unwrap();

        let tasks = db.list_tasks().unwrap();

        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().any(|t| t.id == "t1" && t.text == "Buy milk"));
        assert!(tasks.iter().any(|t| t.id == "t2" && t.status == "in-progress"));
    }

    #[test]
    fn create_writes_no_history_entry() {
        let db = setup_db();

        db.create_task("t1", "Buy milk", "todo").unwrap();

        assert!(db.list_history(HistoryOrder::Insertion).unwrap().is_empty());
    }

    #[test]
    fn duplicate_id_is_rejected_without_mutating_state() {
        let db = setup_db();
        db.create_task("t1", "Buy milk", "todo").unwrap();

        let err = db
            .create_task("t1", "Something else", "done")
            .expect_err("Duplicate id should be rejected");
        let api_err = ApiError::from(err);
        assert_eq!(api_err.code, ErrorCode::DuplicateTaskId);

        // The original task is untouched and no history row appeared
        let tasks = db.list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "Buy milk");
        assert_eq!(tasks[0].status, "todo");
        assert!(db.list_history(HistoryOrder::Insertion).unwrap().is_empty());
    }

    #[test]
    fn update_status_changes_value_and_appends_one_history_entry() {
        let db = setup_db();
        db.create_task("t1", "Buy milk", "todo").unwrap();

        let task = db.update_status("t1", "done").unwrap();

        assert_eq!(task.status, "done");
        assert_eq!(db.get_task("t1").unwrap().unwrap().status, "done");

        let history = db.list_history(HistoryOrder::Insertion).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, "Task \"Buy milk\" moved to done");
    }

    #[test]
    fn update_status_to_current_value_writes_no_history() {
        let db = setup_db();
        db.create_task("t1", "Buy milk", "todo").unwrap();

        let task = db.update_status("t1", "todo").unwrap();

        assert_eq!(task.status, "todo");
        assert!(db.list_history(HistoryOrder::Insertion).unwrap().is_empty());
    }

    #[test]
    fn update_status_accepts_any_string_transition() {
        let db = setup_db();
        db.create_task("t1", "Buy milk", "todo").unwrap();

        db.update_status("t1", "blocked-on-weather").unwrap();
        db.update_status("t1", "todo").unwrap();

        assert_eq!(db.get_task("t1").unwrap().unwrap().status, "todo");
        assert_eq!(db.list_history(HistoryOrder::Insertion).unwrap().len(), 2);
    }

    #[test]
    fn update_status_of_missing_task_fails_and_leaves_history_unchanged() {
        let db = setup_db();

        let err = db
            .update_status("ghost", "done")
            .expect_err("Missing task should be rejected");
        let api_err = ApiError::from(err);
        assert_eq!(api_err.code, ErrorCode::TaskNotFound);
        assert!(db.list_history(HistoryOrder::Insertion).unwrap().is_empty());
    }

    #[test]
    fn delete_removes_task_and_appends_history_with_old_status() {
        let db = setup_db();
        db.create_task("t1", "Buy milk", "todo").unwrap();
        db.update_status("t1", "done").unwrap();

        db.delete_task("t1").unwrap();

        assert!(db.list_tasks().unwrap().is_empty());
        assert!(db.get_task("t1").unwrap().is_none());

        let history = db.list_history(HistoryOrder::Insertion).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].action, "Task \"Buy milk\" deleted from done");
    }

    #[test]
    fn delete_of_missing_task_fails_and_leaves_history_unchanged() {
        let db = setup_db();

        let err = db
            .delete_task("ghost")
            .expect_err("Missing task should be rejected");
        let api_err = ApiError::from(err);
        assert_eq!(api_err.code, ErrorCode::TaskNotFound);
        assert!(db.list_history(HistoryOrder::Insertion).unwrap().is_empty());
    }

    #[test]
    fn deleted_id_can_be_created_again() {
        let db = setup_db();
        db.create_task("t1", "Buy milk", "todo").unwrap();
        db.delete_task("t1").unwrap();

        db.create_task("t1", "Buy oat milk", "todo")
            .expect("Hard-deleted id should be reusable");

        assert_eq!(db.get_task("t1").unwrap().unwrap().text, "Buy oat milk");
    }

    #[test]
    fn derived_history_timestamps_are_twelve_hour_clock() {
        let db = setup_db();
        db.create_task("t1", "Buy milk", "todo").unwrap();
        db.update_status("t1", "done").unwrap();

        let history = db.list_history(HistoryOrder::Insertion).unwrap();
        chrono::NaiveTime::parse_from_str(&history[0].timestamp, "%I:%M:%S %p")
            .expect("Timestamp should be an HH:MM:SS AM/PM string");
    }
}

mod history_tests {
    use super::*;

    #[test]
    fn append_assigns_monotonically_increasing_ids() {
        let db = setup_db();

        let first = db.append_history("one", "01:00:00 PM").unwrap();
        let second = db.append_history("two", "01:00:01 PM").unwrap();
        let third = db.append_history("three", "01:00:02 PM").unwrap();

        assert!(first.id < second.id);
        assert!(second.id < third.id);
    }

    #[test]
    fn reverse_listing_is_exact_opposite_of_insertion() {
        let db = setup_db();
        for (action, ts) in [
            ("one", "01:00:00 PM"),
            ("two", "01:00:01 PM"),
            ("three", "01:00:02 PM"),
        ] {
            db.append_history(action, ts).unwrap();
        }

        let forward = db.list_history(HistoryOrder::Insertion).unwrap();
        let mut reversed = db.list_history(HistoryOrder::Reverse).unwrap();
        reversed.reverse();

        assert_eq!(forward.len(), 3);
        assert_eq!(forward, reversed);
        assert_eq!(forward[0].action, "one");
        assert_eq!(forward[2].action, "three");
    }

    #[test]
    fn caller_supplied_timestamps_are_stored_verbatim() {
        let db = setup_db();

        db.append_history("manual entry", "whenever o'clock").unwrap();

        let history = db.list_history(HistoryOrder::Insertion).unwrap();
        assert_eq!(history[0].timestamp, "whenever o'clock");
    }
}

mod reset_tests {
    use super::*;

    #[test]
    fn reset_empties_both_collections() {
        let db = setup_db();
        db.create_task("t1", "Buy milk", "todo").unwrap();
        db.update_status("t1", "done").unwrap();
        db.append_history("manual entry", "01:00:00 PM").unwrap();

        db.reset().unwrap();

        assert!(db.list_tasks().unwrap().is_empty());
        assert!(db.list_history(HistoryOrder::Insertion).unwrap().is_empty());
    }

    #[test]
    fn reset_on_empty_store_succeeds() {
        let db = setup_db();

        db.reset().unwrap();
        db.reset().unwrap();

        assert!(db.list_tasks().unwrap().is_empty());
    }

    #[test]
    fn history_ids_are_not_reused_after_reset() {
        let db = setup_db();
        let before = db.append_history("before reset", "01:00:00 PM").unwrap();

        db.reset().unwrap();

        let after = db.append_history("after reset", "01:00:01 PM").unwrap();
        assert!(after.id > before.id);
    }
}

mod scenario_tests {
    use super::*;

    /// The full lifecycle: create, update, delete, reset.
    #[test]
    fn full_task_lifecycle() {
        let db = setup_db();

        db.create_task("t1", "Buy milk", "todo").unwrap();
        let tasks = db.list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "t1");
        assert_eq!(tasks[0].text, "Buy milk");
        assert_eq!(tasks[0].status, "todo");

        db.update_status("t1", "done").unwrap();
        assert_eq!(db.get_task("t1").unwrap().unwrap().status, "done");
        let history = db.list_history(HistoryOrder::Insertion).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, "Task \"Buy milk\" moved to done");

        db.delete_task("t1").unwrap();
        assert!(db.list_tasks().unwrap().is_empty());
        let history = db.list_history(HistoryOrder::Insertion).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].action, "Task \"Buy milk\" deleted from done");

        db.reset().unwrap();
        assert!(db.list_tasks().unwrap().is_empty());
        assert!(db.list_history(HistoryOrder::Insertion).unwrap().is_empty());
    }
}

mod persistence_tests {
    use super::*;

    #[test]
    fn data_survives_reopening_the_database() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = dir.path().join("tasks.db");

        {
            let db = Database::open(&db_path).unwrap();
            db.create_task("t1", "Buy milk", "todo").unwrap();
            db.update_status("t1", "done").unwrap();
        }

        let db = Database::open(&db_path).unwrap();
        let tasks = db.list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].status, "done");
        assert_eq!(db.list_history(HistoryOrder::Insertion).unwrap().len(), 1);
    }
}
