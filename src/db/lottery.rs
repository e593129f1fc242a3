//! Lottery draws and draw history.
//!
//! A draw first rolls against the no-prize probability derived from overtime,
//! then picks a prize by weight. Money prizes credit the wallet in the same
//! SQLite transaction that persists the draw record, so no reader can observe
//! a payout without its record or vice versa.

use super::prizes::active_prizes_internal;
use super::tasks::get_task_internal;
use super::wallet::credit_internal;
use super::{Database, now_ms};
use crate::error::{EngineError, EngineResult};
use crate::payout::PayoutRule;
use crate::selection::weighted_pick;
use crate::types::{LotteryHistoryEntry, LotteryOutcome, LotteryRecord};
use anyhow::{Result, anyhow};
use rand::Rng;
use rusqlite::{Connection, Row, params};
use tracing::{debug, info};

/// Chance that a draw yields no prize: 10 percentage points per full hour of
/// overtime, capped at 100%.
pub fn no_prize_probability(hours_exceeded: i64) -> f64 {
    (hours_exceeded as f64 * 0.1).min(1.0)
}

fn parse_record_row(row: &Row) -> rusqlite::Result<LotteryRecord> {
    Ok(LotteryRecord {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        prize_id: row.get("prize_id")?,
        draw_time: row.get("draw_time")?,
        hours_exceeded: row.get("hours_exceeded")?,
        no_prize_probability: row.get("no_prize_probability")?,
    })
}

fn record_draw(
    conn: &Connection,
    task_id: i64,
    prize_id: Option<i64>,
    hours_exceeded: i64,
    probability: f64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO lottery_records (task_id, prize_id, draw_time, hours_exceeded, no_prize_probability)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![task_id, prize_id, now_ms(), hours_exceeded, probability],
    )?;
    Ok(conn.last_insert_rowid())
}

impl Database {
    /// Run a lottery draw for a completed task.
    ///
    /// Persists an immutable record for every draw, prize or not. When the
    /// selected prize resolves to a positive currency amount through
    /// `payout`, the wallet is credited atomically with the record.
    pub fn draw_lottery<R: Rng + ?Sized>(
        &self,
        task_id: i64,
        hours_exceeded: i64,
        rng: &mut R,
        payout: &dyn PayoutRule,
    ) -> EngineResult<LotteryOutcome> {
        if hours_exceeded < 0 {
            return Err(EngineError::invalid_value(
                "hours_exceeded",
                "hours exceeded cannot be negative",
            ));
        }

        let probability = no_prize_probability(hours_exceeded);

        let outcome = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            get_task_internal(&tx, task_id)?
                .ok_or_else(|| anyhow!(EngineError::task_not_found(task_id)))?;

            let roll: f64 = rng.r#gen();
            if roll < probability {
                record_draw(&tx, task_id, None, hours_exceeded, probability)?;
                tx.commit()?;
                return Ok(LotteryOutcome {
                    prize: None,
                    no_prize_probability: probability,
                    wallet_credited: false,
                    message: None,
                });
            }

            let prizes = active_prizes_internal(&tx)?;
            let picked = weighted_pick(&prizes, |prize| prize.weight, rng);
            let Some(prize) = picked.cloned() else {
                // Empty or all-zero-weight pool: a normal no-prize outcome.
                record_draw(&tx, task_id, None, hours_exceeded, probability)?;
                tx.commit()?;
                return Ok(LotteryOutcome {
                    prize: None,
                    no_prize_probability: probability,
                    wallet_credited: false,
                    message: Some("no prizes available".to_string()),
                });
            };

            let record_id = record_draw(&tx, task_id, Some(prize.id), hours_exceeded, probability)?;

            let mut wallet_credited = false;
            if let Some(amount) = payout.payout_amount(&prize).filter(|a| *a > 0.0) {
                credit_internal(
                    &tx,
                    amount,
                    &format!("lottery payout: {}", prize.name),
                    Some(record_id),
                )?;
                wallet_credited = true;
            }

            tx.commit()?;
            Ok(LotteryOutcome {
                prize: Some(prize),
                no_prize_probability: probability,
                wallet_credited,
                message: None,
            })
        })?;

        match &outcome.prize {
            Some(prize) => info!(
                task_id,
                prize_id = prize.id,
                wallet_credited = outcome.wallet_credited,
                "lottery draw won a prize"
            ),
            None => debug!(task_id, probability, "lottery draw yielded no prize"),
        }
        Ok(outcome)
    }

    /// Raw draw records for one task, oldest-first, for audit views.
    pub fn lottery_records_for_task(&self, task_id: i64) -> EngineResult<Vec<LotteryRecord>> {
        let records = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM lottery_records WHERE task_id = ?1 ORDER BY id ASC",
            )?;
            let records = stmt
                .query_map(params![task_id], parse_record_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })?;
        Ok(records)
    }

    /// Draw history, newest-first, joined with task and prize display fields.
    /// Deleted tasks and retired prizes resolve to NULLs rather than dropping
    /// the record.
    pub fn lottery_history(&self, limit: i64) -> EngineResult<Vec<LotteryHistoryEntry>> {
        let entries = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT lr.id, lr.task_id, lr.prize_id, lr.draw_time,
                        lr.hours_exceeded, lr.no_prize_probability,
                        t.title AS task_title,
                        p.name AS prize_name, p.description AS prize_description
                 FROM lottery_records lr
                 LEFT JOIN tasks t ON t.id = lr.task_id
                 LEFT JOIN prizes p ON p.id = lr.prize_id
                 ORDER BY lr.draw_time DESC, lr.id DESC
                 LIMIT ?1",
            )?;

            let entries = stmt
                .query_map(params![limit], |row| {
                    Ok(LotteryHistoryEntry {
                        id: row.get("id")?,
                        task_id: row.get("task_id")?,
                        prize_id: row.get("prize_id")?,
                        draw_time: row.get("draw_time")?,
                        hours_exceeded: row.get("hours_exceeded")?,
                        no_prize_probability: row.get("no_prize_probability")?,
                        task_title: row.get("task_title")?,
                        prize_name: row.get("prize_name")?,
                        prize_description: row.get("prize_description")?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(entries)
        })?;
        Ok(entries)
    }
}
