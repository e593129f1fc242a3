//! Core types for the task/lottery engine.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a task.
///
/// `pending -> in_progress -> completed -> archived`, with a reactivation
/// back-edge from `completed` and `archived` to `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Archived,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "in_progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            "archived" => Some(TaskStatus::Archived),
            _ => None,
        }
    }
}

/// A task in the pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Relative selection weight for `draw_task` (>= 1 via the public API).
    pub weight: i64,
    pub status: TaskStatus,
    pub created_at: i64,
    /// Set when the task is started; cleared on reactivation.
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    /// Self-imposed time limit in minutes, set when the task is started.
    pub time_limit: Option<i64>,
    pub archived_at: Option<i64>,
}

/// Result of completing a task: the updated row plus the overtime penalty
/// input for the lottery draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionOutcome {
    pub task: Task,
    pub hours_exceeded: i64,
    /// Completion always makes the task lottery-eligible.
    pub lottery_eligible: bool,
}

/// A prize in the pool. Soft-deleted via `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prize {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub weight: i64,
    pub is_active: bool,
    /// Explicitly flagged currency payout. When unset, a payout may still be
    /// inferred from the prize text (see `payout::PayoutRule`).
    pub is_money: bool,
    pub money_amount: Option<f64>,
    pub created_at: i64,
}

/// An immutable audit record of a single lottery draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotteryRecord {
    pub id: i64,
    pub task_id: i64,
    /// None = no-prize outcome.
    pub prize_id: Option<i64>,
    pub draw_time: i64,
    pub hours_exceeded: i64,
    /// The probability actually used for this draw, persisted for audit.
    pub no_prize_probability: f64,
}

/// What a lottery draw produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotteryOutcome {
    pub prize: Option<Prize>,
    pub no_prize_probability: f64,
    /// True when a money prize credited the wallet as part of this draw.
    pub wallet_credited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A lottery record joined with display fields for history views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotteryHistoryEntry {
    pub id: i64,
    pub task_id: i64,
    pub prize_id: Option<i64>,
    pub draw_time: i64,
    pub hours_exceeded: i64,
    pub no_prize_probability: f64,
    pub task_title: Option<String>,
    pub prize_name: Option<String>,
    pub prize_description: Option<String>,
}

/// Direction of a wallet transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

/// An immutable row in the wallet ledger. `amount` is a positive magnitude;
/// the sign is carried by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: i64,
    pub amount: f64,
    pub kind: TransactionKind,
    pub description: String,
    pub lottery_record_id: Option<i64>,
    pub created_at: i64,
}
