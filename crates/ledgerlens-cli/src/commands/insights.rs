//! Insight report display commands

use anyhow::Result;
use chrono::Local;
use ledgerlens_core::{
    db::Database,
    insights::{InsightReport, StoredReport},
};

pub fn cmd_insights(db: &Database, user_id: &str, json: bool, symbol: &str) -> Result<()> {
    let Some(stored) = db.latest_report(user_id)? else {
        println!("No insight reports for {}. Generate one with:", user_id);
        println!("  ledgerlens run");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&stored)?);
    } else {
        print_report(&stored, symbol);
    }
    Ok(())
}

pub fn cmd_insights_history(
    db: &Database,
    user_id: &str,
    limit: usize,
    json: bool,
    symbol: &str,
) -> Result<()> {
    let history = db.report_history(user_id, limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    if history.is_empty() {
        println!("No insight reports for {}.", user_id);
        return Ok(());
    }

    println!();
    println!("🗂  Report History for {} ({} shown)", user_id, history.len());
    println!("   ─────────────────────────────────────────────────────────────");
    for stored in &history {
        let summary = &stored.report.summary;
        println!(
            "   [{}] {} │ spent {}{:.2} │ {} alert(s) │ {} subscription(s)",
            stored.id,
            stored.generated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            symbol,
            summary.total_debited,
            stored.report.alerts.len(),
            stored.report.subscriptions.len()
        );
    }
    Ok(())
}

fn print_report(stored: &StoredReport, symbol: &str) {
    let report: &InsightReport = &stored.report;
    let summary = &report.summary;

    println!();
    println!(
        "💡 Insights for {} (generated {})",
        stored.user_id,
        stored
            .generated_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
    );
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Last {} days", summary.window_days);
    println!("   Spent:    {}{:.2}", symbol, summary.total_debited);
    println!("   Received: {}{:.2}", symbol, summary.total_credited);
    println!("   Daily average: {}{:.2}", symbol, summary.average_daily_debit);
    if let Some(category) = &summary.largest_category {
        println!("   Top category: {}", category);
    }
    if let Some(merchant) = &summary.largest_merchant {
        println!("   Top merchant: {}", merchant);
    }

    if !report.alerts.is_empty() {
        println!();
        println!("🚨 Alerts");
        for alert in &report.alerts {
            println!("   • {}", alert);
        }
    }

    if !report.patterns.is_empty() {
        println!();
        println!("📈 Patterns");
        for pattern in &report.patterns {
            println!("   • {}", pattern);
        }
    }

    if !report.subscriptions.is_empty() {
        println!();
        println!("🔁 Subscriptions");
        for sub in &report.subscriptions {
            let next = sub
                .next_payment
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "   {:<24} {}{:>10.2} {:<9} next {}",
                sub.merchant, symbol, sub.average_amount, sub.cycle, next
            );
        }
    }

    let prediction = &report.prediction;
    println!();
    println!("🔮 Next month");
    println!(
        "   Predicted spend: {}{:.2} ({}, monthly average {}{:.2})",
        symbol, prediction.predicted_total, prediction.trend, symbol, prediction.historical_mean
    );
    for (category, amount) in &prediction.category_predictions {
        let trend = prediction
            .category_trends
            .get(category)
            .map(|t| t.as_str())
            .unwrap_or("flat");
        println!("   {:<16} {}{:>10.2}  {}", category, symbol, amount, trend);
    }

    if !report.recommendations.is_empty() {
        println!();
        println!("✅ Recommendations");
        for rec in &report.recommendations {
            println!("   • {}", rec);
        }
    }
}
