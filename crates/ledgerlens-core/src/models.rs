//! Domain models for LedgerLens

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category assigned to a transaction before it has been classified
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Direction of money movement on the user's account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Money leaving the account
    Debit,
    /// Money entering the account
    Credit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "DEBIT",
            Self::Credit => "CREDIT",
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEBIT" | "DR" => Ok(Self::Debit),
            "CREDIT" | "CR" => Ok(Self::Credit),
            _ => Err(format!("Unknown transaction direction: {}", s)),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ledger transaction as consumed by the insight pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction id (assigned by the ledger)
    pub id: String,
    pub user_id: String,
    /// Account reference (masked account number upstream)
    pub account_id: String,
    /// Always non-negative; the sign lives in `direction`
    pub amount: f64,
    pub direction: Direction,
    pub value_date: DateTime<Utc>,
    pub narration: String,
    /// May be empty when the ledger has no merchant for the entry
    pub merchant: String,
    pub category: String,
}

impl Transaction {
    pub fn is_debit(&self) -> bool {
        self.direction == Direction::Debit
    }

    pub fn is_credit(&self) -> bool {
        self.direction == Direction::Credit
    }
}

/// A transaction as written by ingestion (before load-time validation)
///
/// `value_date` is kept verbatim; rows whose date cannot be parsed are
/// excluded when the ledger is loaded rather than rejected on write.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub id: String,
    pub user_id: String,
    pub account_id: String,
    pub amount: f64,
    pub direction: Direction,
    pub value_date: String,
    pub narration: String,
    pub merchant: String,
    pub category: Option<String>,
}

/// Recent transactions for one user, newest first
#[derive(Debug, Clone, Default)]
pub struct LedgerBatch {
    pub transactions: Vec<Transaction>,
    /// Rows skipped because of an unparseable date, unknown direction
    /// or negative amount
    pub malformed: usize,
}

impl LedgerBatch {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
