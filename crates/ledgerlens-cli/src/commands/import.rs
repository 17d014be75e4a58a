//! Ledger import command

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use ledgerlens_core::{db::Database, import::parse_ledger_csv};

/// Import a ledger CSV; returns (imported, skipped duplicates)
pub fn cmd_import(db: &Database, file: &Path) -> Result<(usize, usize)> {
    println!("📥 Importing ledger from {}...", file.display());

    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;
    let transactions = parse_ledger_csv(csv_file)
        .with_context(|| format!("Failed to parse {}", file.display()))?;

    println!("   Found {} transactions", transactions.len());

    let imported = db
        .insert_transactions(&transactions)
        .context("Failed to store transactions")?;
    let skipped = transactions.len() - imported;

    println!();
    println!("✅ Import complete!");
    println!("   Imported: {}", imported);
    if skipped > 0 {
        println!("   Skipped (already present): {}", skipped);
    }

    Ok((imported, skipped))
}
