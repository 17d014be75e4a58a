//! Anomaly Detector
//!
//! Flags debits that sit far above the user's own baseline for the category:
//! `amount > mean + k * std`, with `k` defaulting to 2.5.
//!
//! Categories whose baseline has zero spread are skipped entirely. Without
//! that, a user who always pays the same amount would have every repeat of it
//! compared against a zero-width band.

use std::collections::BTreeMap;

use crate::models::Transaction;

use super::types::{AnomalyRecord, CategoryBaseline};

/// Mean and sample standard deviation of debit amounts per category
pub fn compute_baselines(transactions: &[Transaction]) -> BTreeMap<String, CategoryBaseline> {
    let mut buckets: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for tx in transactions.iter().filter(|t| t.is_debit()) {
        buckets.entry(tx.category.as_str()).or_default().push(tx.amount);
    }

    buckets
        .into_iter()
        .map(|(category, amounts)| {
            let mean = mean(&amounts);
            let baseline = CategoryBaseline {
                mean,
                std_dev: sample_std_dev(&amounts, mean),
                samples: amounts.len(),
            };
            (category.to_string(), baseline)
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Detects unusually large debits relative to the category baseline
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    std_multiplier: f64,
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(2.5)
    }
}

impl AnomalyDetector {
    pub fn new(std_multiplier: f64) -> Self {
        Self { std_multiplier }
    }

    /// Flag anomalous debits, preserving input order
    pub fn detect(&self, transactions: &[Transaction]) -> Vec<AnomalyRecord> {
        if transactions.is_empty() {
            return vec![];
        }

        let baselines = compute_baselines(transactions);

        transactions
            .iter()
            .filter(|t| t.is_debit())
            .filter_map(|tx| {
                let baseline = baselines.get(&tx.category)?;
                if baseline.std_dev == 0.0 {
                    return None;
                }
                if tx.amount <= baseline.mean + self.std_multiplier * baseline.std_dev {
                    return None;
                }
                Some(AnomalyRecord {
                    amount: tx.amount,
                    category: tx.category.clone(),
                    merchant: tx.merchant.clone(),
                    narration: tx.narration.clone(),
                    date: tx.value_date,
                    reason: format!(
                        "Unusually high compared to your typical {} spending.",
                        tx.category
                    ),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{credit, debit_in};

    fn food_history() -> Vec<Transaction> {
        [100.0, 110.0, 90.0, 100.0, 105.0, 95.0, 100.0, 100.0, 100.0, 100.0]
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                debit_in(
                    "Food",
                    "SWIGGY",
                    *amount,
                    &format!("2026-01-{:02}T13:00:00Z", i + 1),
                )
            })
            .collect()
    }

    #[test]
    fn test_baselines_use_sample_std_dev() {
        let txns = vec![
            debit_in("Food", "KFC", 10.0, "2026-01-01T12:00:00Z"),
            debit_in("Food", "KFC", 20.0, "2026-01-02T12:00:00Z"),
            debit_in("Rent", "NOBROKER", 900.0, "2026-01-03T12:00:00Z"),
        ];
        let baselines = compute_baselines(&txns);

        let food = baselines["Food"];
        assert_eq!(food.mean, 15.0);
        assert!((food.std_dev - 50f64.sqrt()).abs() < 1e-9);
        assert_eq!(food.samples, 2);

        // One sample: no spread
        assert_eq!(baselines["Rent"].std_dev, 0.0);
    }

    #[test]
    fn test_baselines_ignore_credits() {
        let mut refund = credit("r1", "SWIGGY", 5000.0, "2026-01-05T12:00:00Z");
        refund.category = "Food".to_string();
        let mut txns = food_history();
        txns.push(refund);

        let baselines = compute_baselines(&txns);
        assert_eq!(baselines["Food"].samples, 10);
    }

    #[test]
    fn test_flags_ten_times_baseline() {
        let mut txns = food_history();
        txns.push(debit_in("Food", "BEHROOZ BIRYANI", 1000.0, "2026-01-20T21:00:00Z"));

        let anomalies = AnomalyDetector::default().detect(&txns);
        assert_eq!(anomalies.len(), 1);
        let a = &anomalies[0];
        assert_eq!(a.amount, 1000.0);
        assert_eq!(a.merchant, "BEHROOZ BIRYANI");
        assert!(a.reason.contains("Food"));
    }

    #[test]
    fn test_zero_spread_category_never_flagged() {
        let txns: Vec<_> = (1..=6)
            .map(|d| debit_in("Rent", "NOBROKER", 25_000.0, &format!("2026-0{}-01T09:00:00Z", d)))
            .collect();
        assert!(AnomalyDetector::default().detect(&txns).is_empty());
    }

    #[test]
    fn test_output_preserves_input_order() {
        let mut txns = food_history();
        txns.insert(0, debit_in("Food", "LATE", 900.0, "2026-02-01T12:00:00Z"));
        txns.push(debit_in("Food", "EARLY", 950.0, "2025-12-01T12:00:00Z"));
        for i in 0..10 {
            let at = format!("2026-01-{:02}T19:00:00Z", i + 11);
            txns.push(debit_in("Food", "SWIGGY", 100.0, &at));
        }

        let anomalies = AnomalyDetector::default().detect(&txns);
        let merchants: Vec<_> = anomalies.iter().map(|a| a.merchant.as_str()).collect();
        assert_eq!(merchants, vec!["LATE", "EARLY"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(AnomalyDetector::default().detect(&[]).is_empty());
    }
}
