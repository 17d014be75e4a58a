//! Insight Aggregator
//!
//! Composes the analyzer outputs with a trailing-window summary, spending
//! patterns, threshold alerts and recommendations into one [`InsightReport`].
//! Pure: persistence belongs to the agent.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

use crate::config::InsightConfig;
use crate::models::Transaction;

use super::engine::AnalysisContext;
use super::round2;
use super::types::{
    AnomalyRecord, InsightReport, PredictionReport, SpendSummary, SubscriptionRecord,
    REPORT_SCHEMA_VERSION,
};

/// Builds the final report for one user
pub struct InsightAggregator<'a> {
    config: &'a InsightConfig,
    now: DateTime<Utc>,
}

impl<'a> InsightAggregator<'a> {
    pub fn new(ctx: &AnalysisContext<'a>) -> Self {
        Self {
            config: ctx.config,
            now: ctx.now,
        }
    }

    pub fn compose(
        &self,
        transactions: &[Transaction],
        subscriptions: Vec<SubscriptionRecord>,
        anomalies: Vec<AnomalyRecord>,
        prediction: PredictionReport,
    ) -> InsightReport {
        let summary = self.summarize(transactions);
        let patterns = self.detect_patterns(transactions);
        let alerts = self.build_alerts(transactions, &anomalies);
        let recommendations = self.recommend(&summary, &subscriptions);

        InsightReport {
            schema_version: REPORT_SCHEMA_VERSION,
            summary,
            patterns,
            alerts,
            subscriptions,
            anomalies,
            prediction,
            recommendations,
            generated_at: self.now,
        }
    }

    /// Totals and leaders over the trailing window
    pub fn summarize(&self, transactions: &[Transaction]) -> SpendSummary {
        let window_days = self.config.summary_window_days;
        let recent: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| (self.now - t.value_date).num_days() <= window_days)
            .collect();

        if recent.is_empty() {
            return SpendSummary::empty(window_days);
        }

        let mut total_debited = 0.0;
        let mut total_credited = 0.0;
        let mut by_category: BTreeMap<&str, f64> = BTreeMap::new();
        let mut by_merchant: BTreeMap<&str, f64> = BTreeMap::new();

        for tx in recent {
            if tx.is_credit() {
                total_credited += tx.amount;
                continue;
            }
            total_debited += tx.amount;
            *by_category.entry(tx.category.as_str()).or_insert(0.0) += tx.amount;
            let merchant = tx.merchant.trim();
            if !merchant.is_empty() {
                *by_merchant.entry(merchant).or_insert(0.0) += tx.amount;
            }
        }

        SpendSummary {
            window_days,
            total_debited: round2(total_debited),
            total_credited: round2(total_credited),
            largest_category: largest(&by_category),
            largest_merchant: largest(&by_merchant),
            average_daily_debit: round2(total_debited / window_days as f64),
        }
    }

    /// Spending habits over the whole ledger, in a fixed order
    pub fn detect_patterns(&self, transactions: &[Transaction]) -> Vec<String> {
        if transactions.is_empty() {
            return vec![];
        }
        let debits: Vec<&Transaction> = transactions.iter().filter(|t| t.is_debit()).collect();

        let mut patterns = Vec::new();

        let (weekend, weekday): (Vec<&Transaction>, Vec<&Transaction>) = debits
            .iter()
            .copied()
            .partition(|t| matches!(t.value_date.weekday(), Weekday::Sat | Weekday::Sun));
        if sum(&weekend) > sum(&weekday) {
            patterns.push("You tend to spend more on weekends.".to_string());
        } else {
            patterns.push("You spend more during weekdays.".to_string());
        }

        let total = sum(&debits);
        let evening: f64 = debits
            .iter()
            .filter(|t| t.value_date.hour() >= self.config.evening_hour)
            .map(|t| t.amount)
            .sum();
        if evening > total * self.config.evening_share {
            patterns.push("Your evening spending is higher than usual.".to_string());
        }

        if category_debit(transactions, "Food") > self.config.food_pattern_threshold {
            patterns.push("Your food expenses are consistently high.".to_string());
        }

        patterns
    }

    /// Category threshold alerts, then one alert per anomaly
    pub fn build_alerts(
        &self,
        transactions: &[Transaction],
        anomalies: &[AnomalyRecord],
    ) -> Vec<String> {
        let mut alerts = Vec::new();

        if category_debit(transactions, "Food") > self.config.food_alert_threshold {
            alerts.push("Food spending is significantly higher than usual.".to_string());
        }
        if category_debit(transactions, "Transport") > self.config.transport_alert_threshold {
            alerts.push("Transport costs seem unusually high.".to_string());
        }

        for anomaly in anomalies {
            let label = if anomaly.merchant.trim().is_empty() {
                anomaly.narration.as_str()
            } else {
                anomaly.merchant.as_str()
            };
            alerts.push(format!(
                "Unusual spending detected: {} - {}{:.2}",
                label, self.config.currency_symbol, anomaly.amount
            ));
        }

        alerts
    }

    pub fn recommend(
        &self,
        summary: &SpendSummary,
        subscriptions: &[SubscriptionRecord],
    ) -> Vec<String> {
        let mut recs = Vec::new();

        match summary.largest_category.as_deref() {
            Some("Food") => recs.push(
                "Consider reducing food delivery orders to improve savings.".to_string(),
            ),
            Some("Shopping") => recs.push(
                "Shopping is your biggest expense this month. You may want to set a budget."
                    .to_string(),
            ),
            _ => {}
        }

        let subscription_cost: f64 = subscriptions.iter().map(|s| s.average_amount).sum();
        if subscription_cost > self.config.subscription_cost_threshold {
            recs.push(format!(
                "Your monthly subscriptions cost {}{:.2}. Consider removing unused services.",
                self.config.currency_symbol,
                round2(subscription_cost)
            ));
        }

        recs
    }
}

fn sum(txns: &[&Transaction]) -> f64 {
    txns.iter().map(|t| t.amount).sum()
}

fn category_debit(transactions: &[Transaction], category: &str) -> f64 {
    transactions
        .iter()
        .filter(|t| t.is_debit() && t.category == category)
        .map(|t| t.amount)
        .sum()
}

/// Key with the largest total; ties go to the lexically smallest key
fn largest(totals: &BTreeMap<&str, f64>) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;
    for (&key, &total) in totals {
        match best {
            Some((_, best_total)) if total <= best_total => {}
            _ => best = Some((key, total)),
        }
    }
    best.map(|(key, _)| key.to_string())
}
