//! LedgerLens Core Library
//!
//! Shared functionality for the LedgerLens financial insight agent:
//! - Transaction store (SQLite with SQLCipher) and report history
//! - CSV import of ledger exports
//! - Keyword categorization of transactions
//! - Insight pipeline: anomalies, subscriptions, forecasts, summaries
//! - The insight agent and its recurring scheduler

pub mod agent;
pub mod categorize;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod insights;
pub mod models;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod test_utils;

pub use agent::{InsightAgent, RunSummary};
pub use categorize::{categorize, categorize_batch, categorize_transaction, DEFAULT_CATEGORY};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AgentConfig, InsightConfig};
pub use db::Database;
pub use error::{Error, Result};
pub use import::parse_ledger_csv;
pub use insights::{InsightPipeline, InsightReport, StoredReport};
pub use models::{Direction, LedgerBatch, NewTransaction, Transaction};
pub use scheduler::{run_forever, start_agent_loop, AgentSchedule, ScheduleStats};
pub use store::InsightStore;
