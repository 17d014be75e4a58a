//! LedgerLens CLI - Financial insight agent
//!
//! Usage:
//!   ledgerlens init                 Initialize database
//!   ledgerlens import --file CSV    Import ledger transactions
//!   ledgerlens run                  Run one insight pass
//!   ledgerlens watch                Run insight passes until Ctrl+C
//!   ledgerlens insights USER        Show the latest report for a user

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Import { file } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_import(&db, &file).map(|_| ())
        }
        Commands::Run => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_run(db, config).map(|_| ())
        }
        Commands::Watch { interval } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_watch(db, config, interval).await
        }
        Commands::Users => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_users(&db)
        }
        Commands::Transactions { user, limit } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_transactions(&db, &user, limit, &config.insights.currency_symbol)
        }
        Commands::Insights {
            user,
            history,
            limit,
            json,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            let symbol = &config.insights.currency_symbol;
            if history {
                commands::cmd_insights_history(&db, &user, limit, json, symbol)
            } else {
                commands::cmd_insights(&db, &user, json, symbol)
            }
        }
        Commands::Categorize {
            merchant,
            narration,
            credit,
        } => commands::cmd_categorize(&merchant, &narration, credit),
    }
}
