//! Structured error types for engine operations.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    MissingRequiredField,
    InvalidFieldValue,

    // State machine violations
    InvalidState,

    // Not found errors
    TaskNotFound,
    PrizeNotFound,

    // Wallet errors
    InsufficientBalance,

    // Draw errors (nothing eligible; distinct from a draw that wins nothing)
    NoTasksAvailable,
    ZeroTotalWeight,

    // Internal errors
    DatabaseError,
    InternalError,
}

/// Structured error returned by every engine operation.
#[derive(Debug, Serialize, Error)]
#[error("{message}")]
pub struct EngineError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl EngineError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            details: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
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

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, reason).with_field(field)
    }

    pub fn task_not_found(task_id: i64) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task not found: {}", task_id),
        )
    }

    pub fn prize_not_found(prize_id: i64) -> Self {
        Self::new(
            ErrorCode::PrizeNotFound,
            format!("Prize not found: {}", prize_id),
        )
    }

    pub fn invalid_state(task_id: i64, status: &str, wanted: &str) -> Self {
        Self::new(
            ErrorCode::InvalidState,
            format!(
                "Task {} is {}, operation requires {}",
                task_id, status, wanted
            ),
        )
    }

    pub fn insufficient_balance(requested: f64, balance: f64) -> Self {
        Self::new(
            ErrorCode::InsufficientBalance,
            format!("Cannot debit {:.2}: balance is {:.2}", requested, balance),
        )
    }

    pub fn no_tasks_available() -> Self {
        Self::new(ErrorCode::NoTasksAvailable, "No pending tasks to draw from")
    }

    pub fn zero_total_weight() -> Self {
        Self::new(
            ErrorCode::ZeroTotalWeight,
            "All pending tasks have zero weight",
        )
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }
}

// Allow using ? with anyhow errors by converting them
impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        // Try to downcast to EngineError first
        match err.downcast::<EngineError>() {
            Ok(engine_err) => engine_err,
            Err(err) => EngineError::database(err),
        }
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
