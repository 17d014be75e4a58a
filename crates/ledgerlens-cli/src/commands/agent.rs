//! Insight agent commands (single pass and continuous mode)

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use ledgerlens_core::{
    config::AgentConfig,
    db::Database,
    scheduler::{run_forever, AgentSchedule},
    InsightAgent, RunSummary, SystemClock,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub fn cmd_run(db: Database, config: AgentConfig) -> Result<RunSummary> {
    println!("🔍 Running insight pass...");

    let agent = InsightAgent::new(db, SystemClock, config);
    let summary = agent.run_once().context("Insight pass failed")?;

    print_summary(&summary);
    Ok(summary)
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("📊 Pass Results");
    println!("   ─────────────────────────────");
    println!("   Users: {}", summary.users_seen);
    println!("   Reports written: {}", summary.reports_written);
    if summary.users_skipped > 0 {
        println!("   Skipped (no transactions): {}", summary.users_skipped);
    }
    if summary.malformed_records > 0 {
        println!("   ⚠️  Malformed records ignored: {}", summary.malformed_records);
    }
    if summary.users_failed > 0 {
        println!(
            "   ❌ Failed users: {} (see log for details)",
            summary.users_failed
        );
    }
}

pub async fn cmd_watch(
    db: Database,
    mut config: AgentConfig,
    interval: Option<u64>,
) -> Result<()> {
    if let Some(secs) = interval {
        if secs == 0 {
            bail!("--interval must be at least 1 second");
        }
        config.interval = Duration::from_secs(secs);
    }

    let schedule = AgentSchedule::from_config(&config);
    let agent = Arc::new(InsightAgent::new(db, SystemClock, config));
    let shutdown = CancellationToken::new();

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown requested, finishing current pass");
                signal_token.cancel();
            }
            Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
        }
    });

    println!(
        "👀 Watching ledger every {}s (Ctrl+C to stop)...",
        schedule.interval.as_secs()
    );

    let stats = run_forever(agent, schedule, shutdown).await;

    println!();
    println!("🛑 Stopped after {} pass(es)", stats.passes);
    println!("   Reports written: {}", stats.reports_written);
    if stats.failed_passes > 0 {
        println!("   ❌ Failed passes: {}", stats.failed_passes);
    }

    Ok(())
}
