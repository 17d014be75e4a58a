//! User and transaction command implementations

use anyhow::Result;
use ledgerlens_core::{categorize_transaction, db::Database, models::Direction};

use super::truncate;

pub fn cmd_users(db: &Database) -> Result<()> {
    let users = db.list_user_ids()?;

    if users.is_empty() {
        println!("No users found. Import a ledger with:");
        println!("  ledgerlens import --file ledger.csv");
        return Ok(());
    }

    println!();
    println!("👥 Users ({})", users.len());
    for user in users {
        println!("   {}", user);
    }
    Ok(())
}

pub fn cmd_transactions(db: &Database, user_id: &str, limit: usize, symbol: &str) -> Result<()> {
    let batch = db.load_recent_transactions(user_id, limit)?;

    if batch.is_empty() {
        println!("No transactions found for {}.", user_id);
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions for {}", user_id);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in &batch.transactions {
        // Red for debits, green for credits
        let amount_str = match tx.direction {
            Direction::Debit => format!("\x1b[31m-{}{:.2}\x1b[0m", symbol, tx.amount),
            Direction::Credit => format!("\x1b[32m+{}{:.2}\x1b[0m", symbol, tx.amount),
        };
        let label = if tx.merchant.is_empty() {
            &tx.narration
        } else {
            &tx.merchant
        };

        println!(
            "   {} │ {:>12} │ {}",
            tx.value_date.format("%Y-%m-%d"),
            amount_str,
            truncate(label, 40)
        );
    }

    if batch.malformed > 0 {
        println!();
        println!("   ⚠️  {} malformed record(s) not shown", batch.malformed);
    }

    Ok(())
}

pub fn cmd_categorize(merchant: &str, narration: &str, credit: bool) -> Result<()> {
    let direction = if credit {
        Direction::Credit
    } else {
        Direction::Debit
    };
    let category = categorize_transaction(merchant, narration, direction);

    println!("🏷  {} ({}) → {}", merchant_or_dash(merchant), direction, category);
    Ok(())
}

fn merchant_or_dash(merchant: &str) -> &str {
    if merchant.trim().is_empty() {
        "-"
    } else {
        merchant
    }
}
