//! Task CRUD and lifecycle operations.
//!
//! Lifecycle: `pending -> in_progress -> completed -> archived`, with
//! reactivation from `completed` or `archived` back to `pending`. Every
//! transition is a status-guarded UPDATE inside a transaction, so concurrent
//! double-starts or double-completes lose the race with a state conflict
//! instead of double-processing.

use super::{Database, now_ms};
use crate::error::{EngineError, EngineResult, ErrorCode};
use crate::selection::weighted_pick;
use crate::types::{CompletionOutcome, Task, TaskStatus};
use anyhow::{Result, anyhow};
use rand::Rng;
use rusqlite::{Connection, Row, params};
use tracing::{debug, info};

/// Whole hours of overtime, rounded up from any fractional overage.
/// One minute past the limit counts as a full hour.
pub fn overtime_hours(elapsed_minutes: f64, time_limit_minutes: i64) -> i64 {
    let exceeded = (elapsed_minutes - time_limit_minutes as f64).max(0.0);
    (exceeded / 60.0).ceil() as i64
}

pub(crate) fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let status_str: String = row.get("status")?;
    let status = TaskStatus::from_str(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown task status: {}", status_str).into(),
        )
    })?;

    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        weight: row.get("weight")?,
        status,
        created_at: row.get("created_at")?,
        started_at: row.get("started_at")?,
        completed_at: row.get("completed_at")?,
        time_limit: row.get("time_limit")?,
        archived_at: row.get("archived_at")?,
    })
}

/// Internal helper to get a task using an existing connection.
pub(crate) fn get_task_internal(conn: &Connection, task_id: i64) -> Result<Option<Task>> {
    let mut stmt = conn.prepare("SELECT * FROM tasks WHERE id = ?1")?;

    let result = stmt.query_row(params![task_id], parse_task_row);

    match result {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn require_task(conn: &Connection, task_id: i64) -> Result<Task> {
    get_task_internal(conn, task_id)?
        .ok_or_else(|| anyhow!(EngineError::task_not_found(task_id)))
}

impl Database {
    /// Create a new task in `pending` status.
    pub fn create_task(
        &self,
        title: &str,
        description: Option<&str>,
        weight: i64,
    ) -> EngineResult<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EngineError::missing_field("title"));
        }
        if weight < 1 {
            return Err(EngineError::invalid_value("weight", "weight must be at least 1"));
        }

        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from);
        let now = now_ms();

        let task = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (title, description, weight, status, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![title, description, weight, TaskStatus::Pending.as_str(), now],
            )?;
            require_task(conn, conn.last_insert_rowid())
        })?;

        info!(task_id = task.id, weight, "created task");
        Ok(task)
    }

    /// Get a task by id.
    pub fn get_task(&self, task_id: i64) -> EngineResult<Option<Task>> {
        Ok(self.with_conn(|conn| get_task_internal(conn, task_id))?)
    }

    /// List tasks, optionally filtered by status, newest-first.
    pub fn list_tasks(&self, status: Option<TaskStatus>) -> EngineResult<Vec<Task>> {
        let tasks = self.with_conn(|conn| {
            let tasks = match status {
                Some(status) => {
                    let mut stmt = conn.prepare(
                        "SELECT * FROM tasks WHERE status = ?1 ORDER BY created_at DESC, id DESC",
                    )?;
                    let tasks = stmt
                        .query_map(params![status.as_str()], parse_task_row)?
                        .collect::<Result<Vec<_>, _>>()?;
                    tasks
                }
                None => {
                    let mut stmt =
                        conn.prepare("SELECT * FROM tasks ORDER BY created_at DESC, id DESC")?;
                    let tasks = stmt
                        .query_map([], parse_task_row)?
                        .collect::<Result<Vec<_>, _>>()?;
                    tasks
                }
            };
            Ok(tasks)
        })?;
        Ok(tasks)
    }

    /// Update a task's title, description, or weight.
    pub fn update_task(
        &self,
        task_id: i64,
        title: Option<&str>,
        description: Option<&str>,
        weight: Option<i64>,
    ) -> EngineResult<Task> {
        if title.is_none() && description.is_none() && weight.is_none() {
            return Err(EngineError::new(
                ErrorCode::MissingRequiredField,
                "No updatable fields provided",
            ));
        }
        if let Some(title) = title
            && title.trim().is_empty()
        {
            return Err(EngineError::missing_field("title"));
        }
        if let Some(weight) = weight
            && weight < 1
        {
            return Err(EngineError::invalid_value("weight", "weight must be at least 1"));
        }

        let task = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            require_task(&tx, task_id)?;

            if let Some(title) = title {
                tx.execute(
                    "UPDATE tasks SET title = ?1 WHERE id = ?2",
                    params![title.trim(), task_id],
                )?;
            }
            if let Some(description) = description {
                let description = Some(description.trim()).filter(|d| !d.is_empty());
                tx.execute(
                    "UPDATE tasks SET description = ?1 WHERE id = ?2",
                    params![description, task_id],
                )?;
            }
            if let Some(weight) = weight {
                tx.execute(
                    "UPDATE tasks SET weight = ?1 WHERE id = ?2",
                    params![weight, task_id],
                )?;
            }

            let task = require_task(&tx, task_id)?;
            tx.commit()?;
            Ok(task)
        })?;
        Ok(task)
    }

    /// Delete a task permanently.
    pub fn delete_task(&self, task_id: i64) -> EngineResult<()> {
        let deleted = self.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?)
        })?;
        if deleted == 0 {
            return Err(EngineError::task_not_found(task_id));
        }
        info!(task_id, "deleted task");
        Ok(())
    }

    /// Draw one pending task, with probability proportional to weight.
    ///
    /// Does not mutate anything; the caller decides whether to start the
    /// drawn task. Distinguishes an empty pool from an all-zero-weight pool
    /// so the caller can surface which.
    pub fn draw_task<R: Rng + ?Sized>(&self, rng: &mut R) -> EngineResult<Task> {
        let pending = self.list_tasks(Some(TaskStatus::Pending))?;
        if pending.is_empty() {
            return Err(EngineError::no_tasks_available());
        }

        let picked = weighted_pick(&pending, |task| task.weight, rng)
            .ok_or_else(EngineError::zero_total_weight)?;

        debug!(task_id = picked.id, pool = pending.len(), "drew task");
        Ok(picked.clone())
    }

    /// Start a pending task with a self-imposed time limit in minutes.
    pub fn start_task(&self, task_id: i64, time_limit_minutes: i64) -> EngineResult<Task> {
        if time_limit_minutes < 1 {
            return Err(EngineError::invalid_value(
                "time_limit",
                "time limit must be at least 1 minute",
            ));
        }

        let now = now_ms();
        let task = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let task = require_task(&tx, task_id)?;
            if task.status != TaskStatus::Pending {
                return Err(anyhow!(EngineError::invalid_state(
                    task_id,
                    task.status.as_str(),
                    TaskStatus::Pending.as_str(),
                )));
            }

            // Status-guarded update: a racing start loses here.
            let changed = tx.execute(
                "UPDATE tasks SET status = ?1, started_at = ?2, time_limit = ?3
                 WHERE id = ?4 AND status = ?5",
                params![
                    TaskStatus::InProgress.as_str(),
                    now,
                    time_limit_minutes,
                    task_id,
                    TaskStatus::Pending.as_str(),
                ],
            )?;
            if changed != 1 {
                return Err(anyhow!(EngineError::invalid_state(
                    task_id,
                    task.status.as_str(),
                    TaskStatus::Pending.as_str(),
                )));
            }

            let task = require_task(&tx, task_id)?;
            tx.commit()?;
            Ok(task)
        })?;

        info!(task_id, time_limit_minutes, "started task");
        Ok(task)
    }

    /// Complete an in-progress task.
    ///
    /// The authoritative elapsed time is wall-clock now minus `started_at`,
    /// computed here; any timer shown while the task ran is presentational.
    pub fn complete_task(&self, task_id: i64) -> EngineResult<CompletionOutcome> {
        let now = now_ms();
        let outcome = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let task = require_task(&tx, task_id)?;
            if task.status != TaskStatus::InProgress {
                return Err(anyhow!(EngineError::invalid_state(
                    task_id,
                    task.status.as_str(),
                    TaskStatus::InProgress.as_str(),
                )));
            }

            let started_at = task
                .started_at
                .ok_or_else(|| anyhow!(EngineError::internal("in-progress task has no started_at")))?;
            let time_limit = task.time_limit.unwrap_or(0);

            let elapsed_minutes = (now - started_at) as f64 / 60_000.0;
            let hours_exceeded = overtime_hours(elapsed_minutes, time_limit);

            let changed = tx.execute(
                "UPDATE tasks SET status = ?1, completed_at = ?2
                 WHERE id = ?3 AND status = ?4",
                params![
                    TaskStatus::Completed.as_str(),
                    now,
                    task_id,
                    TaskStatus::InProgress.as_str(),
                ],
            )?;
            if changed != 1 {
                return Err(anyhow!(EngineError::invalid_state(
                    task_id,
                    task.status.as_str(),
                    TaskStatus::InProgress.as_str(),
                )));
            }

            let task = require_task(&tx, task_id)?;
            tx.commit()?;
            Ok(CompletionOutcome {
                task,
                hours_exceeded,
                lottery_eligible: true,
            })
        })?;

        info!(
            task_id,
            hours_exceeded = outcome.hours_exceeded,
            "completed task"
        );
        Ok(outcome)
    }

    /// Archive a task. Allowed from any live status; archiving an already
    /// archived task is a state conflict.
    pub fn archive_task(&self, task_id: i64) -> EngineResult<Task> {
        let now = now_ms();
        let task = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let task = require_task(&tx, task_id)?;
            if task.status == TaskStatus::Archived {
                return Err(anyhow!(EngineError::invalid_state(
                    task_id,
                    task.status.as_str(),
                    "a non-archived status",
                )));
            }

            let changed = tx.execute(
                "UPDATE tasks SET status = ?1, archived_at = ?2
                 WHERE id = ?3 AND status != ?1",
                params![TaskStatus::Archived.as_str(), now, task_id],
            )?;
            if changed != 1 {
                return Err(anyhow!(EngineError::invalid_state(
                    task_id,
                    task.status.as_str(),
                    "a non-archived status",
                )));
            }

            let task = require_task(&tx, task_id)?;
            tx.commit()?;
            Ok(task)
        })?;

        info!(task_id, "archived task");
        Ok(task)
    }

    /// Put a completed or archived task back in the pending pool, clearing
    /// all timing fields.
    pub fn reactivate_task(&self, task_id: i64) -> EngineResult<Task> {
        let task = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let task = require_task(&tx, task_id)?;
            if task.status != TaskStatus::Completed && task.status != TaskStatus::Archived {
                return Err(anyhow!(EngineError::invalid_state(
                    task_id,
                    task.status.as_str(),
                    "completed or archived",
                )));
            }

            let changed = tx.execute(
                "UPDATE tasks SET status = ?1,
                        started_at = NULL, completed_at = NULL,
                        time_limit = NULL, archived_at = NULL
                 WHERE id = ?2 AND status IN (?3, ?4)",
                params![
                    TaskStatus::Pending.as_str(),
                    task_id,
                    TaskStatus::Completed.as_str(),
                    TaskStatus::Archived.as_str(),
                ],
            )?;
            if changed != 1 {
                return Err(anyhow!(EngineError::invalid_state(
                    task_id,
                    task.status.as_str(),
                    "completed or archived",
                )));
            }

            let task = require_task(&tx, task_id)?;
            tx.commit()?;
            Ok(task)
        })?;

        info!(task_id, "reactivated task");
        Ok(task)
    }
}
