//! Prize pool management.
//!
//! Prizes are soft-deleted via `is_active`; the lottery only ever reads the
//! active set, so history records keep resolving against retired prizes.

use super::{Database, now_ms};
use crate::error::{EngineError, EngineResult, ErrorCode};
use crate::types::Prize;
use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row, params};
use tracing::info;

pub(crate) fn parse_prize_row(row: &Row) -> rusqlite::Result<Prize> {
    Ok(Prize {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        weight: row.get("weight")?,
        is_active: row.get("is_active")?,
        is_money: row.get("is_money")?,
        money_amount: row.get("money_amount")?,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn get_prize_internal(conn: &Connection, prize_id: i64) -> Result<Option<Prize>> {
    let mut stmt = conn.prepare("SELECT * FROM prizes WHERE id = ?1")?;

    let result = stmt.query_row(params![prize_id], parse_prize_row);

    match result {
        Ok(prize) => Ok(Some(prize)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All active prizes, newest-first.
pub(crate) fn active_prizes_internal(conn: &Connection) -> Result<Vec<Prize>> {
    let mut stmt = conn
        .prepare("SELECT * FROM prizes WHERE is_active = 1 ORDER BY created_at DESC, id DESC")?;
    let prizes = stmt
        .query_map([], parse_prize_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(prizes)
}

fn validate_money_fields(is_money: bool, money_amount: Option<f64>) -> EngineResult<()> {
    if let Some(amount) = money_amount {
        if amount <= 0.0 {
            return Err(EngineError::invalid_value(
                "money_amount",
                "money amount must be greater than 0",
            ));
        }
        if !is_money {
            return Err(EngineError::invalid_value(
                "money_amount",
                "money_amount requires the is_money flag",
            ));
        }
    }
    Ok(())
}

impl Database {
    /// Create a new prize.
    pub fn create_prize(
        &self,
        name: &str,
        description: Option<&str>,
        weight: i64,
        is_money: bool,
        money_amount: Option<f64>,
    ) -> EngineResult<Prize> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::missing_field("name"));
        }
        if weight < 1 {
            return Err(EngineError::invalid_value("weight", "weight must be at least 1"));
        }
        validate_money_fields(is_money, money_amount)?;

        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from);
        let now = now_ms();

        let prize = self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO prizes (name, description, weight, is_active, is_money, money_amount, created_at)
                 VALUES (?1, ?2, ?3, 1, ?4, ?5, ?6)",
                params![name, description, weight, is_money, money_amount, now],
            )?;
            get_prize_internal(conn, conn.last_insert_rowid())?
                .ok_or_else(|| anyhow!("prize vanished after insert"))
        })?;

        info!(prize_id = prize.id, weight, "created prize");
        Ok(prize)
    }

    /// Get a prize by id.
    pub fn get_prize(&self, prize_id: i64) -> EngineResult<Option<Prize>> {
        Ok(self.with_conn(|conn| get_prize_internal(conn, prize_id))?)
    }

    /// List prizes, newest-first. `active_only` hides soft-deleted prizes.
    pub fn list_prizes(&self, active_only: bool) -> EngineResult<Vec<Prize>> {
        let prizes = self.with_conn(|conn| {
            if active_only {
                active_prizes_internal(conn)
            } else {
                let mut stmt =
                    conn.prepare("SELECT * FROM prizes ORDER BY created_at DESC, id DESC")?;
                let prizes = stmt
                    .query_map([], parse_prize_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(prizes)
            }
        })?;
        Ok(prizes)
    }

    /// All active prizes, newest-first.
    pub fn active_prizes(&self) -> EngineResult<Vec<Prize>> {
        Ok(self.with_conn(active_prizes_internal)?)
    }

    /// Update a prize's fields.
    #[allow(clippy::too_many_arguments)]
    pub fn update_prize(
        &self,
        prize_id: i64,
        name: Option<&str>,
        description: Option<&str>,
        weight: Option<i64>,
        is_money: Option<bool>,
        money_amount: Option<Option<f64>>,
    ) -> EngineResult<Prize> {
        if name.is_none()
            && description.is_none()
            && weight.is_none()
            && is_money.is_none()
            && money_amount.is_none()
        {
            return Err(EngineError::new(
                ErrorCode::MissingRequiredField,
                "No updatable fields provided",
            ));
        }
        if let Some(name) = name
            && name.trim().is_empty()
        {
            return Err(EngineError::missing_field("name"));
        }
        if let Some(weight) = weight
            && weight < 1
        {
            return Err(EngineError::invalid_value("weight", "weight must be at least 1"));
        }

        let prize = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let existing = get_prize_internal(&tx, prize_id)?
                .ok_or_else(|| anyhow!(EngineError::prize_not_found(prize_id)))?;

            // Validate the flag/amount pair as it will exist after the update.
            let next_is_money = is_money.unwrap_or(existing.is_money);
            let next_amount = money_amount.unwrap_or(existing.money_amount);
            validate_money_fields(next_is_money, next_amount)
                .map_err(anyhow::Error::new)?;

            if let Some(name) = name {
                tx.execute(
                    "UPDATE prizes SET name = ?1 WHERE id = ?2",
                    params![name.trim(), prize_id],
                )?;
            }
            if let Some(description) = description {
                let description = Some(description.trim()).filter(|d| !d.is_empty());
                tx.execute(
                    "UPDATE prizes SET description = ?1 WHERE id = ?2",
                    params![description, prize_id],
                )?;
            }
            if let Some(weight) = weight {
                tx.execute(
                    "UPDATE prizes SET weight = ?1 WHERE id = ?2",
                    params![weight, prize_id],
                )?;
            }
            if let Some(is_money) = is_money {
                tx.execute(
                    "UPDATE prizes SET is_money = ?1 WHERE id = ?2",
                    params![is_money, prize_id],
                )?;
            }
            if let Some(money_amount) = money_amount {
                tx.execute(
                    "UPDATE prizes SET money_amount = ?1 WHERE id = ?2",
                    params![money_amount, prize_id],
                )?;
            }

            let prize = get_prize_internal(&tx, prize_id)?
                .ok_or_else(|| anyhow!(EngineError::prize_not_found(prize_id)))?;
            tx.commit()?;
            Ok(prize)
        })?;
        Ok(prize)
    }

    /// Soft-delete a prize. Existing lottery records keep referencing it.
    pub fn deactivate_prize(&self, prize_id: i64) -> EngineResult<Prize> {
        let prize = self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE prizes SET is_active = 0 WHERE id = ?1",
                params![prize_id],
            )?;
            if changed == 0 {
                return Err(anyhow!(EngineError::prize_not_found(prize_id)));
            }
            get_prize_internal(conn, prize_id)?
                .ok_or_else(|| anyhow!(EngineError::prize_not_found(prize_id)))
        })?;

        info!(prize_id, "deactivated prize");
        Ok(prize)
    }
}
