//! Structured error types for API responses.

use serde::Serialize;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    MissingRequiredField,

    // Not found errors
    TaskNotFound,

    // Conflict errors
    DuplicateTaskId,

    // Internal errors
    DatabaseError,
    InternalError,
}

/// Structured error for API responses.
#[derive(Debug, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    // Convenience constructors

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("{} is required", field),
        )
        .with_field(field)
    }

    pub fn task_not_found(task_id: &str) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task not found: {}", task_id),
        )
    }

    pub fn duplicate_id(task_id: &str) -> Self {
        Self::new(
            ErrorCode::DuplicateTaskId,
            format!("Duplicate task id: {}", task_id),
        )
    }

    pub fn database(err: impl std::fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }
}

// Allow using ? with anyhow errors by converting them
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        // Try to downcast to ApiError first, then to a raw storage error
        match err.downcast::<ApiError>() {
            Ok(api_err) => api_err,
            Err(err) => match err.downcast::<rusqlite::Error>() {
                Ok(db_err) => ApiError::database(db_err),
                Err(err) => ApiError::internal(err),
            },
        }
    }
}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_serialize_screaming_snake_case() {
        let err = ApiError::duplicate_id("t1");
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("DUPLICATE_TASK_ID"));
        assert!(json.contains("Duplicate task id: t1"));
    }

    #[test]
    fn missing_field_carries_field_name() {
        let err = ApiError::missing_field("status");
        assert_eq!(err.code, ErrorCode::MissingRequiredField);
        assert_eq!(err.field.as_deref(), Some("status"));
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("\"field\":\"status\""));
    }

    #[test]
    fn field_is_omitted_when_absent() {
        let err = ApiError::task_not_found("t1");
        let json = serde_json::to_string(&err).unwrap();
        assert!(!json.contains("field"));
    }

    #[test]
    fn anyhow_roundtrip_preserves_structured_error() {
        let err: anyhow::Error = ApiError::task_not_found("t9").into();
        let back = ApiError::from(err);
        assert_eq!(back.code, ErrorCode::TaskNotFound);
    }

    #[test]
    fn anyhow_storage_error_maps_to_database_error() {
        let err: anyhow::Error = rusqlite::Error::QueryReturnedNoRows.into();
        let back = ApiError::from(err);
        assert_eq!(back.code, ErrorCode::DatabaseError);
    }
}
