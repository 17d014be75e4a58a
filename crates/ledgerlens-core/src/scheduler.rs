//! Continuous mode for the insight agent
//!
//! Runs a pass, sleeps for the configured interval, repeats. A pass runs on the
//! blocking pool since the store is synchronous. Cancellation is observed only
//! between passes, so a pass in flight always finishes its writes.
//!
//! A pass that errors or panics is logged and the loop carries on.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::agent::InsightAgent;
use crate::clock::Clock;
use crate::config::AgentConfig;
use crate::store::InsightStore;

/// How often the agent runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSchedule {
    pub interval: Duration,
}

impl AgentSchedule {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.interval)
    }
}

/// Counters for a finished loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleStats {
    /// Passes started, including failed ones
    pub passes: u64,
    pub failed_passes: u64,
    pub reports_written: u64,
}

/// Run passes until `shutdown` is cancelled
pub async fn run_forever<S, C>(
    agent: Arc<InsightAgent<S, C>>,
    schedule: AgentSchedule,
    shutdown: CancellationToken,
) -> ScheduleStats
where
    S: InsightStore + 'static,
    C: Clock + 'static,
{
    info!(
        interval_secs = schedule.interval.as_secs(),
        "Starting insight agent loop"
    );
    let mut stats = ScheduleStats::default();

    while !shutdown.is_cancelled() {
        stats.passes += 1;

        let pass_agent = Arc::clone(&agent);
        match tokio::task::spawn_blocking(move || pass_agent.run_once()).await {
            Ok(Ok(summary)) => {
                stats.reports_written += summary.reports_written as u64;
            }
            Ok(Err(e)) => {
                stats.failed_passes += 1;
                error!(pass = stats.passes, error = %e, "Insight pass failed");
            }
            Err(e) => {
                stats.failed_passes += 1;
                error!(pass = stats.passes, error = %e, "Insight pass panicked");
            }
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(schedule.interval) => {}
        }
    }

    info!(
        passes = stats.passes,
        failed = stats.failed_passes,
        reports = stats.reports_written,
        "Insight agent loop stopped"
    );
    stats
}

/// Start the agent loop as a background task
pub fn start_agent_loop<S, C>(
    agent: Arc<InsightAgent<S, C>>,
    schedule: AgentSchedule,
    shutdown: CancellationToken,
) -> JoinHandle<ScheduleStats>
where
    S: InsightStore + 'static,
    C: Clock + 'static,
{
    tokio::spawn(run_forever(agent, schedule, shutdown))
}
