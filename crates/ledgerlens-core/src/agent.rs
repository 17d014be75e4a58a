//! Insight Agent - one pass over every user in the store
//!
//! For each user: load recent transactions, categorize, analyze, aggregate and
//! append the report. Users are independent; a failure for one is logged and
//! counted and the pass moves on.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, info, warn};

use crate::categorize::categorize_batch;
use crate::clock::Clock;
use crate::config::AgentConfig;
use crate::error::Result;
use crate::insights::{AnalysisContext, InsightPipeline, InsightReport};
use crate::store::InsightStore;

/// Outcome counters for one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub users_seen: usize,
    pub reports_written: usize,
    /// Users with no usable transactions
    pub users_skipped: usize,
    pub users_failed: usize,
    /// Rows excluded at load time across all users
    pub malformed_records: usize,
}

/// What happened to a single user
struct UserPass {
    report: Option<InsightReport>,
    malformed: usize,
}

/// Orchestrates the insight pipeline over a store
pub struct InsightAgent<S, C> {
    store: S,
    clock: C,
    config: AgentConfig,
    pipeline: InsightPipeline,
}

impl<S: InsightStore, C: Clock> InsightAgent<S, C> {
    pub fn new(store: S, clock: C, config: AgentConfig) -> Self {
        let pipeline = InsightPipeline::from_config(&config.insights);
        Self {
            store,
            clock,
            config,
            pipeline,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one pass over every user
    ///
    /// Only a failure to list users fails the pass as a whole.
    pub fn run_once(&self) -> Result<RunSummary> {
        let user_ids = self.store.list_user_ids()?;
        let mut summary = RunSummary {
            users_seen: user_ids.len(),
            ..Default::default()
        };

        for user_id in &user_ids {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_user(user_id)));
            match outcome {
                Ok(Ok(pass)) => {
                    summary.malformed_records += pass.malformed;
                    if pass.report.is_some() {
                        summary.reports_written += 1;
                    } else {
                        summary.users_skipped += 1;
                    }
                }
                Ok(Err(e)) => {
                    error!(user_id = %user_id, error = %e, "Failed to process user");
                    summary.users_failed += 1;
                }
                Err(_) => {
                    error!(user_id = %user_id, "Processing user panicked");
                    summary.users_failed += 1;
                }
            }
        }

        info!(
            users = summary.users_seen,
            reports = summary.reports_written,
            skipped = summary.users_skipped,
            failed = summary.users_failed,
            "Insight pass complete"
        );
        Ok(summary)
    }

    /// Generate and persist a report for one user
    ///
    /// Returns `None` when the user has no usable transactions.
    pub fn process_user(&self, user_id: &str) -> Result<Option<InsightReport>> {
        Ok(self.run_user(user_id)?.report)
    }

    fn run_user(&self, user_id: &str) -> Result<UserPass> {
        let batch = self
            .store
            .load_recent_transactions(user_id, self.config.transaction_limit)?;

        if batch.malformed > 0 {
            warn!(
                user_id = %user_id,
                malformed = batch.malformed,
                "Skipped malformed transactions"
            );
        }

        if batch.is_empty() {
            debug!(user_id = %user_id, "No transactions, skipping");
            return Ok(UserPass {
                report: None,
                malformed: batch.malformed,
            });
        }

        let transactions = categorize_batch(batch.transactions);
        let ctx = AnalysisContext::new(&self.config.insights, self.clock.now());
        let report = self.pipeline.generate(&ctx, &transactions);

        let report_id = self.store.append_report(user_id, &report)?;
        debug!(
            user_id = %user_id,
            report_id,
            transactions = transactions.len(),
            "Report stored"
        );

        Ok(UserPass {
            report: Some(report),
            malformed: batch.malformed,
        })
    }
}
