//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// LedgerLens - Insights from your transaction ledger
#[derive(Parser)]
#[command(name = "ledgerlens")]
#[command(about = "Financial insight agent for transaction ledgers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "ledgerlens.db", global = true)]
    pub db: PathBuf,

    /// Agent config file (defaults to ~/.config/ledgerlens/agent.toml, then built-in)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set LEDGERLENS_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Import ledger transactions from CSV
    ///
    /// Expected header: txn_id,user_id,account_id,amount,direction,value_date,narration,merchant[,category]
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Run a single insight pass over every user
    Run,

    /// Run insight passes continuously until Ctrl+C
    Watch {
        /// Seconds between passes (overrides config and LEDGERLENS_AGENT_INTERVAL)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// List users with transactions
    Users,

    /// Show a user's recent transactions
    Transactions {
        /// User id
        user: String,

        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show insight reports for a user
    Insights {
        /// User id
        user: String,

        /// Show report history instead of only the latest report
        #[arg(long)]
        history: bool,

        /// Number of reports to show with --history
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the category a transaction would be assigned
    Categorize {
        /// Merchant name
        #[arg(short, long, default_value = "")]
        merchant: String,

        /// Narration / description text
        #[arg(short, long, default_value = "")]
        narration: String,

        /// Treat as a credit (money in)
        #[arg(long)]
        credit: bool,
    },
}
