//! Transaction operations

use rusqlite::types::ValueRef;
use rusqlite::{params, Row};

use super::{parse_value_date, Database};
use crate::error::Result;
use crate::models::{Direction, LedgerBatch, NewTransaction, Transaction, UNCATEGORIZED};

/// SQL predicate for rows that can be loaded as a `Transaction`
const VALID_ROW: &str = "(value_ts IS NOT NULL \
    AND typeof(amount) IN ('real', 'integer') AND amount >= 0 \
    AND upper(trim(txn_type)) IN ('DEBIT', 'DR', 'CREDIT', 'CR'))";

/// Sortable form of a raw value date
fn value_ts(value_date: &str) -> Option<i64> {
    parse_value_date(value_date).map(|dt| dt.timestamp())
}

/// A transactions row before validation
struct RawTransaction {
    id: String,
    user_id: String,
    account_id: String,
    amount: Option<f64>,
    direction: String,
    value_date: String,
    narration: String,
    merchant: String,
    category: Option<String>,
}

impl RawTransaction {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let amount = match row.get_ref(3)? {
            ValueRef::Real(v) => Some(v),
            ValueRef::Integer(v) => Some(v as f64),
            _ => None,
        };
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            account_id: row.get(2)?,
            amount,
            direction: row.get(4)?,
            value_date: row.get(5)?,
            narration: row.get(6)?,
            merchant: row.get(7)?,
            category: row.get(8)?,
        })
    }

    /// Validate into a `Transaction`; `None` marks the row malformed
    fn validate(self) -> Option<Transaction> {
        let amount = self.amount.filter(|a| a.is_finite() && *a >= 0.0)?;
        let direction: Direction = self.direction.parse().ok()?;
        let value_date = parse_value_date(&self.value_date)?;

        Some(Transaction {
            id: self.id,
            user_id: self.user_id,
            account_id: self.account_id,
            amount,
            direction,
            value_date,
            narration: self.narration,
            merchant: self.merchant,
            category: self
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
        })
    }
}

impl Database {
    /// Insert a ledger row (skips duplicates based on txn_id)
    ///
    /// Returns true when the row was new.
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<bool> {
        let conn = self.conn()?;
        let inserted = conn.execute(
            r#"
            INSERT OR IGNORE INTO transactions
                (txn_id, user_id, account_id, amount, txn_type, value_date, value_ts,
                 narration, merchant, category)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.id,
                tx.user_id,
                tx.account_id,
                tx.amount,
                tx.direction.as_str(),
                tx.value_date,
                value_ts(&tx.value_date),
                tx.narration,
                tx.merchant,
                tx.category,
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Insert many ledger rows in one SQLite transaction
    ///
    /// Returns the number of new rows; duplicates are skipped.
    pub fn insert_transactions(&self, txns: &[NewTransaction]) -> Result<usize> {
        let mut conn = self.conn()?;
        let db_tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = db_tx.prepare(
                r#"
                INSERT OR IGNORE INTO transactions
                    (txn_id, user_id, account_id, amount, txn_type, value_date, value_ts,
                     narration, merchant, category)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )?;
            for tx in txns {
                inserted += stmt.execute(params![
                    tx.id,
                    tx.user_id,
                    tx.account_id,
                    tx.amount,
                    tx.direction.as_str(),
                    tx.value_date,
                    value_ts(&tx.value_date),
                    tx.narration,
                    tx.merchant,
                    tx.category,
                ])?;
            }
        }
        db_tx.commit()?;
        Ok(inserted)
    }

    /// Distinct users with at least one transaction, sorted
    pub fn list_user_ids(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT DISTINCT user_id FROM transactions ORDER BY user_id")?;
        let users = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(users)
    }

    /// Load a user's most recent transactions, newest first
    ///
    /// Only rows that pass validation compete for the `limit` slots; the rest
    /// are counted in `malformed`.
    pub fn load_recent_transactions(&self, user_id: &str, limit: usize) -> Result<LedgerBatch> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            r#"
            SELECT txn_id, user_id, account_id, amount, txn_type, value_date,
                   narration, merchant, category
            FROM transactions
            WHERE user_id = ? AND {}
            ORDER BY value_ts DESC, txn_id
            LIMIT ?
            "#,
            VALID_ROW
        ))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![user_id, limit], RawTransaction::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let rejected: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM transactions WHERE user_id = ? AND NOT {}",
                VALID_ROW
            ),
            params![user_id],
            |row| row.get(0),
        )?;

        let mut batch = LedgerBatch {
            malformed: usize::try_from(rejected).unwrap_or(0),
            ..Default::default()
        };
        for raw in rows {
            let id = raw.id.clone();
            match raw.validate() {
                Some(tx) => batch.transactions.push(tx),
                None => {
                    tracing::debug!(user_id, txn_id = %id, "Skipping malformed transaction");
                    batch.malformed += 1;
                }
            }
        }

        Ok(batch)
    }

    /// Count total transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }
}
