//! Storage boundary used by the insight agent
//!
//! The agent only needs three operations; anything that can list users,
//! hand back a user's recent ledger and append a report can drive it.

use crate::db::Database;
use crate::error::Result;
use crate::insights::InsightReport;
use crate::models::LedgerBatch;

/// Transaction source and report sink for the insight agent
pub trait InsightStore: Send + Sync {
    /// Distinct users with at least one transaction, sorted
    fn list_user_ids(&self) -> Result<Vec<String>>;

    /// Up to `limit` of the user's most recent transactions, newest first
    fn load_recent_transactions(&self, user_id: &str, limit: usize) -> Result<LedgerBatch>;

    /// Append a report to the user's history, returning its id
    fn append_report(&self, user_id: &str, report: &InsightReport) -> Result<i64>;
}

impl InsightStore for Database {
    fn list_user_ids(&self) -> Result<Vec<String>> {
        Database::list_user_ids(self)
    }

    fn load_recent_transactions(&self, user_id: &str, limit: usize) -> Result<LedgerBatch> {
        Database::load_recent_transactions(self, user_id, limit)
    }

    fn append_report(&self, user_id: &str, report: &InsightReport) -> Result<i64> {
        Database::append_report(self, user_id, report)
    }
}
