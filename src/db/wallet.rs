//! Wallet ledger: a cached balance plus an append-only transaction log.
//!
//! Invariant: the cached balance always equals the signed sum of transaction
//! amounts. Every balance change appends exactly one transaction row in the
//! same SQLite transaction; no code path touches one without the other.

use super::{Database, now_ms};
use crate::error::{EngineError, EngineResult};
use crate::types::{TransactionKind, WalletTransaction};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row, params};
use tracing::info;

fn parse_transaction_row(row: &Row) -> rusqlite::Result<WalletTransaction> {
    let kind_str: String = row.get("kind")?;
    let kind = TransactionKind::from_str(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown transaction kind: {}", kind_str).into(),
        )
    })?;

    Ok(WalletTransaction {
        id: row.get("id")?,
        amount: row.get("amount")?,
        kind,
        description: row.get("description")?,
        lottery_record_id: row.get("lottery_record_id")?,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn balance_internal(conn: &Connection) -> Result<f64> {
    Ok(conn.query_row("SELECT amount FROM wallet WHERE id = 1", [], |row| row.get(0))?)
}

/// Increment the balance and append the income row. Must run inside the
/// caller's transaction.
pub(crate) fn credit_internal(
    conn: &Connection,
    amount: f64,
    description: &str,
    lottery_record_id: Option<i64>,
) -> Result<f64> {
    let now = now_ms();
    conn.execute(
        "UPDATE wallet SET amount = amount + ?1, updated_at = ?2 WHERE id = 1",
        params![amount, now],
    )?;
    conn.execute(
        "INSERT INTO wallet_transactions (amount, kind, description, lottery_record_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            amount,
            TransactionKind::Income.as_str(),
            description,
            lottery_record_id,
            now
        ],
    )?;
    balance_internal(conn)
}

fn validate_amount(amount: f64) -> EngineResult<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(EngineError::invalid_value(
            "amount",
            "amount must be greater than 0",
        ));
    }
    Ok(())
}

impl Database {
    /// Current cached balance.
    pub fn wallet_balance(&self) -> EngineResult<f64> {
        Ok(self.with_conn(balance_internal)?)
    }

    /// Credit the wallet. Returns the new balance.
    pub fn wallet_credit(
        &self,
        amount: f64,
        description: &str,
        lottery_record_id: Option<i64>,
    ) -> EngineResult<f64> {
        validate_amount(amount)?;

        let balance = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let balance = credit_internal(&tx, amount, description, lottery_record_id)?;
            tx.commit()?;
            Ok(balance)
        })?;

        info!(amount, balance, "credited wallet");
        Ok(balance)
    }

    /// Debit the wallet. Fails without any state change when the amount
    /// exceeds the current balance. Returns the new balance.
    pub fn wallet_debit(&self, amount: f64, description: &str) -> EngineResult<f64> {
        validate_amount(amount)?;

        let balance = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let balance = balance_internal(&tx)?;
            if amount > balance {
                return Err(anyhow!(EngineError::insufficient_balance(amount, balance)));
            }

            let now = now_ms();
            tx.execute(
                "UPDATE wallet SET amount = amount - ?1, updated_at = ?2 WHERE id = 1",
                params![amount, now],
            )?;
            tx.execute(
                "INSERT INTO wallet_transactions (amount, kind, description, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![amount, TransactionKind::Expense.as_str(), description, now],
            )?;

            let balance = balance_internal(&tx)?;
            tx.commit()?;
            Ok(balance)
        })?;

        info!(amount, balance, "debited wallet");
        Ok(balance)
    }

    /// Transaction history, newest-first, bounded.
    pub fn wallet_transactions(&self, limit: i64) -> EngineResult<Vec<WalletTransaction>> {
        let transactions = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM wallet_transactions
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1",
            )?;
            let transactions = stmt
                .query_map(params![limit], parse_transaction_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(transactions)
        })?;
        Ok(transactions)
    }
}
