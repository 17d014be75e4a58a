//! Fixtures shared by unit tests

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::insights::InsightReport;
use crate::models::{Direction, LedgerBatch, NewTransaction, Transaction, UNCATEGORIZED};
use crate::store::InsightStore;

pub const TEST_USER: &str = "user-1";

/// Parse an RFC 3339 timestamp
pub fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("fixture timestamp must be RFC 3339")
        .with_timezone(&Utc)
}

fn transaction(
    id: &str,
    merchant: &str,
    amount: f64,
    date: &str,
    direction: Direction,
) -> Transaction {
    Transaction {
        id: id.to_string(),
        user_id: TEST_USER.to_string(),
        account_id: "XXXX1234".to_string(),
        amount,
        direction,
        value_date: ts(date),
        narration: String::new(),
        merchant: merchant.to_string(),
        category: UNCATEGORIZED.to_string(),
    }
}

pub fn debit(id: &str, merchant: &str, amount: f64, date: &str) -> Transaction {
    transaction(id, merchant, amount, date, Direction::Debit)
}

pub fn credit(id: &str, merchant: &str, amount: f64, date: &str) -> Transaction {
    transaction(id, merchant, amount, date, Direction::Credit)
}

/// A debit with its category already assigned
pub fn debit_in(category: &str, merchant: &str, amount: f64, date: &str) -> Transaction {
    let mut tx = debit(&format!("{}-{}-{}", merchant, date, amount), merchant, amount, date);
    tx.category = category.to_string();
    tx
}

/// An ingestion row for store tests
pub fn new_tx(
    id: &str,
    user_id: &str,
    merchant: &str,
    amount: f64,
    direction: Direction,
    value_date: &str,
) -> NewTransaction {
    NewTransaction {
        id: id.to_string(),
        user_id: user_id.to_string(),
        account_id: "XXXX1234".to_string(),
        amount,
        direction,
        value_date: value_date.to_string(),
        narration: format!("UPI/{}", merchant),
        merchant: merchant.to_string(),
        category: None,
    }
}

/// In-memory `InsightStore` with switchable failures
#[derive(Default)]
pub struct MemoryStore {
    ledgers: BTreeMap<String, Vec<Transaction>>,
    malformed: BTreeMap<String, usize>,
    fail_append_for: Option<String>,
    fail_listing: bool,
    panic_listing: bool,
    panic_load_for: Option<String>,
    reports: Mutex<Vec<(String, InsightReport)>>,
    limits: Mutex<Vec<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ledger(mut self, user_id: &str, txns: Vec<Transaction>) -> Self {
        self.ledgers.insert(user_id.to_string(), txns);
        self
    }

    /// Register rows for `user_id` that failed validation
    pub fn with_malformed(mut self, user_id: &str, count: usize) -> Self {
        self.ledgers.entry(user_id.to_string()).or_default();
        self.malformed.insert(user_id.to_string(), count);
        self
    }

    pub fn failing_append_for(mut self, user_id: &str) -> Self {
        self.fail_append_for = Some(user_id.to_string());
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn panicking_listing(mut self) -> Self {
        self.panic_listing = true;
        self
    }

    pub fn panicking_load_for(mut self, user_id: &str) -> Self {
        self.panic_load_for = Some(user_id.to_string());
        self
    }

    pub fn reports(&self) -> Vec<(String, InsightReport)> {
        self.reports.lock().unwrap().clone()
    }

    pub fn limits_seen(&self) -> Vec<usize> {
        self.limits.lock().unwrap().clone()
    }
}

impl InsightStore for MemoryStore {
    fn list_user_ids(&self) -> Result<Vec<String>> {
        if self.panic_listing {
            panic!("ledger store crashed");
        }
        if self.fail_listing {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "ledger store offline",
            )));
        }
        Ok(self.ledgers.keys().cloned().collect())
    }

    fn load_recent_transactions(&self, user_id: &str, limit: usize) -> Result<LedgerBatch> {
        if self.panic_load_for.as_deref() == Some(user_id) {
            panic!("corrupt ledger for {}", user_id);
        }
        self.limits.lock().unwrap().push(limit);
        let mut transactions = self.ledgers.get(user_id).cloned().unwrap_or_default();
        transactions.sort_by(|a, b| b.value_date.cmp(&a.value_date));
        transactions.truncate(limit);
        Ok(LedgerBatch {
            transactions,
            malformed: self.malformed.get(user_id).copied().unwrap_or(0),
        })
    }

    fn append_report(&self, user_id: &str, report: &InsightReport) -> Result<i64> {
        if self.fail_append_for.as_deref() == Some(user_id) {
            return Err(Error::InvalidData(format!("disk full writing {}", user_id)));
        }
        let mut reports = self.reports.lock().unwrap();
        reports.push((user_id.to_string(), report.clone()));
        Ok(reports.len() as i64)
    }
}
