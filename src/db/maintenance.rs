//! Retention maintenance for archived tasks.
//!
//! A plain time-windowed delete; scheduling it is the caller's problem.

use super::{Database, now_ms};
use crate::error::{EngineError, EngineResult};
use crate::types::{Task, TaskStatus};
use rusqlite::params;
use tracing::info;

const DAY_MS: i64 = 86_400_000;

impl Database {
    /// Delete archived tasks whose `archived_at` is older than the retention
    /// window. Returns how many rows were removed.
    pub fn purge_archived_tasks(&self, retention_days: i64) -> EngineResult<usize> {
        if retention_days < 1 {
            return Err(EngineError::invalid_value(
                "retention_days",
                "retention must be at least 1 day",
            ));
        }

        let cutoff = now_ms() - retention_days * DAY_MS;
        let deleted = self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM tasks
                 WHERE status = ?1 AND archived_at IS NOT NULL AND archived_at < ?2",
                params![TaskStatus::Archived.as_str(), cutoff],
            )?)
        })?;

        if deleted > 0 {
            info!(deleted, retention_days, "purged expired archived tasks");
        }
        Ok(deleted)
    }

    /// Archived tasks that will fall out of the retention window within the
    /// next `warn_days`, for reminder views.
    pub fn expiring_archived_tasks(
        &self,
        retention_days: i64,
        warn_days: i64,
    ) -> EngineResult<Vec<Task>> {
        if retention_days < 1 || warn_days < 1 || warn_days > retention_days {
            return Err(EngineError::invalid_value(
                "warn_days",
                "warn window must be between 1 day and the retention window",
            ));
        }

        let now = now_ms();
        let purge_cutoff = now - retention_days * DAY_MS;
        let warn_cutoff = now - (retention_days - warn_days) * DAY_MS;

        let tasks = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM tasks
                 WHERE status = ?1
                   AND archived_at IS NOT NULL
                   AND archived_at < ?2
                   AND archived_at >= ?3
                 ORDER BY archived_at ASC",
            )?;
            let tasks = stmt
                .query_map(
                    params![TaskStatus::Archived.as_str(), warn_cutoff, purge_cutoff],
                    super::tasks::parse_task_row,
                )?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(tasks)
        })?;
        Ok(tasks)
    }
}
