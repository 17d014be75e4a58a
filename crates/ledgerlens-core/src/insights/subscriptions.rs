//! Subscription Detector
//!
//! Finds recurring payments by grouping debits per merchant and checking that
//! a group has:
//! 1. At least two payments
//! 2. Similar amounts (each consecutive pair within a relative tolerance)
//! 3. A mean gap between payments matching a known cycle
//!
//! A merchant failing any check is rejected as a whole; there are no partial
//! matches.

use std::collections::HashMap;

use chrono::Duration;

use crate::models::Transaction;

use super::round2;
use super::types::{Cycle, SubscriptionRecord};

/// Detects recurring merchant payments
#[derive(Debug, Clone)]
pub struct SubscriptionDetector {
    /// Allowed |a - b| / max(a, b) between consecutive payments
    amount_tolerance: f64,
    /// Confidence attached to every record (placeholder, not a statistic)
    confidence: f64,
}

impl Default for SubscriptionDetector {
    fn default() -> Self {
        Self::new(0.20, 0.9)
    }
}

impl SubscriptionDetector {
    pub fn new(amount_tolerance: f64, confidence: f64) -> Self {
        Self {
            amount_tolerance,
            confidence,
        }
    }

    /// Detect subscriptions; output follows merchant discovery order
    pub fn detect(&self, transactions: &[Transaction]) -> Vec<SubscriptionRecord> {
        group_by_merchant(transactions)
            .into_iter()
            .filter_map(|(merchant, group)| self.analyze_merchant(merchant, group))
            .collect()
    }

    fn analyze_merchant(
        &self,
        merchant: String,
        mut group: Vec<&Transaction>,
    ) -> Option<SubscriptionRecord> {
        // Not enough occurrences to be recurring
        if group.len() < 2 {
            return None;
        }

        group.sort_by_key(|t| t.value_date);

        let amounts: Vec<f64> = group.iter().map(|t| t.amount).collect();
        let similar = amounts
            .windows(2)
            .all(|w| amounts_similar(w[0], w[1], self.amount_tolerance));
        if !similar {
            return None;
        }

        let gaps: Vec<i64> = group
            .windows(2)
            .map(|w| (w[1].value_date - w[0].value_date).num_days())
            .collect();
        let mean_gap = gaps.iter().sum::<i64>() as f64 / gaps.len() as f64;
        let cycle = Cycle::from_mean_gap(mean_gap)?;

        let last_payment = group.last()?.value_date;
        let average = amounts.iter().sum::<f64>() / amounts.len() as f64;

        Some(SubscriptionRecord {
            merchant,
            average_amount: round2(average),
            cycle,
            last_payment,
            // None when the date would fall outside the representable range
            next_payment: last_payment.checked_add_signed(Duration::days(cycle.period_days())),
            confidence: self.confidence,
        })
    }
}

/// Normalize a merchant name for grouping
pub fn normalize_merchant(merchant: &str) -> String {
    merchant.trim().to_uppercase()
}

/// Group debits by normalized merchant, keeping first-seen order
fn group_by_merchant(transactions: &[Transaction]) -> Vec<(String, Vec<&Transaction>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&Transaction>)> = Vec::new();

    for tx in transactions.iter().filter(|t| t.is_debit()) {
        let merchant = normalize_merchant(&tx.merchant);
        if merchant.is_empty() {
            continue;
        }
        match index.get(&merchant) {
            Some(&i) => groups[i].1.push(tx),
            None => {
                index.insert(merchant.clone(), groups.len());
                groups.push((merchant, vec![tx]));
            }
        }
    }

    groups
}

/// True when two amounts are within `tolerance` of the larger one
fn amounts_similar(a: f64, b: f64, tolerance: f64) -> bool {
    if a == 0.0 || b == 0.0 {
        return false;
    }
    (a - b).abs() / a.max(b) <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{credit, debit, ts};
    use chrono::{DateTime, Utc};

    #[test]
    fn test_netflix_monthly() {
        let txns = vec![
            debit("n3", "NETFLIX", 648.0, "2026-03-02T08:00:00Z"),
            debit("n1", "NETFLIX", 649.0, "2026-01-01T08:00:00Z"),
            debit("n2", "NETFLIX", 650.0, "2026-01-31T08:00:00Z"),
        ];

        let subs = SubscriptionDetector::default().detect(&txns);
        assert_eq!(subs.len(), 1);
        let sub = &subs[0];
        assert_eq!(sub.merchant, "NETFLIX");
        assert_eq!(sub.cycle, Cycle::Monthly);
        assert!((sub.average_amount - 649.0).abs() < 1e-9);
        assert_eq!(sub.last_payment, ts("2026-03-02T08:00:00Z"));
        assert_eq!(sub.next_payment, Some(ts("2026-04-01T08:00:00Z")));
        assert_eq!(sub.confidence, 0.9);
    }

    #[test]
    fn test_next_payment_past_max_date_is_none() {
        let last = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        let mut first = debit("n1", "NETFLIX", 649.0, "2026-01-01T08:00:00Z");
        first.value_date = last - Duration::days(30);
        let mut second = debit("n2", "NETFLIX", 649.0, "2026-01-31T08:00:00Z");
        second.value_date = last;

        let subs = SubscriptionDetector::default().detect(&[first, second]);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].cycle, Cycle::Monthly);
        assert_eq!(subs[0].last_payment, last);
        assert_eq!(subs[0].next_payment, None);
    }

    #[test]
    fn test_single_payment_is_not_a_subscription() {
        let txns = vec![debit("s1", "SPOTIFY", 119.0, "2026-01-05T08:00:00Z")];
        assert!(SubscriptionDetector::default().detect(&txns).is_empty());
    }

    #[test]
    fn test_merchant_names_are_normalized() {
        let txns = vec![
            debit("a", "  spotify ", 119.0, "2026-01-05T08:00:00Z"),
            debit("b", "SPOTIFY", 119.0, "2026-02-04T08:00:00Z"),
        ];
        let subs = SubscriptionDetector::default().detect(&txns);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].merchant, "SPOTIFY");
    }

    #[test]
    fn test_one_dissimilar_pair_rejects_merchant() {
        let txns = vec![
            debit("a", "HOTSTAR", 299.0, "2026-01-01T08:00:00Z"),
            debit("b", "HOTSTAR", 299.0, "2026-01-31T08:00:00Z"),
            debit("c", "HOTSTAR", 899.0, "2026-03-02T08:00:00Z"),
        ];
        assert!(SubscriptionDetector::default().detect(&txns).is_empty());
    }

    #[test]
    fn test_zero_amount_fails_similarity() {
        assert!(!amounts_similar(0.0, 0.0, 0.2));
        assert!(amounts_similar(100.0, 80.0, 0.2));
        assert!(!amounts_similar(100.0, 79.0, 0.2));
    }

    #[test]
    fn test_quarterly_and_yearly_cycles() {
        let txns = vec![
            debit("q1", "ACT FIBERNET", 2100.0, "2025-01-10T08:00:00Z"),
            debit("q2", "ACT FIBERNET", 2100.0, "2025-04-10T08:00:00Z"),
            debit("y1", "DOMAIN RENEWAL", 1200.0, "2024-02-01T08:00:00Z"),
            debit("y2", "DOMAIN RENEWAL", 1250.0, "2025-02-01T08:00:00Z"),
        ];
        let subs = SubscriptionDetector::default().detect(&txns);
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].cycle, Cycle::Quarterly);
        assert_eq!(subs[0].next_payment, Some(ts("2025-07-09T08:00:00Z")));
        assert_eq!(subs[1].cycle, Cycle::Yearly);
        assert_eq!(subs[1].average_amount, 1225.0);
    }

    #[test]
    fn test_irregular_gaps_rejected() {
        let txns = vec![
            debit("a", "UBER", 200.0, "2026-01-01T08:00:00Z"),
            debit("b", "UBER", 210.0, "2026-01-08T08:00:00Z"),
            debit("c", "UBER", 205.0, "2026-01-20T08:00:00Z"),
        ];
        assert!(SubscriptionDetector::default().detect(&txns).is_empty());
    }

    #[test]
    fn test_credits_and_blank_merchants_ignored() {
        let txns = vec![
            credit("c1", "EMPLOYER", 50_000.0, "2026-01-01T08:00:00Z"),
            credit("c2", "EMPLOYER", 50_000.0, "2026-01-31T08:00:00Z"),
            debit("d1", "", 500.0, "2026-01-01T08:00:00Z"),
            debit("d2", "  ", 500.0, "2026-01-31T08:00:00Z"),
        ];
        assert!(SubscriptionDetector::default().detect(&txns).is_empty());
    }

    #[test]
    fn test_output_follows_discovery_order() {
        let txns = vec![
            debit("z2", "ZEE5", 99.0, "2026-02-10T08:00:00Z"),
            debit("a2", "APPLE MUSIC", 99.0, "2026-02-15T08:00:00Z"),
            debit("z1", "ZEE5", 99.0, "2026-01-11T08:00:00Z"),
            debit("a1", "APPLE MUSIC", 99.0, "2026-01-16T08:00:00Z"),
        ];
        let subs = SubscriptionDetector::default().detect(&txns);
        let merchants: Vec<_> = subs.iter().map(|s| s.merchant.as_str()).collect();
        assert_eq!(merchants, vec!["ZEE5", "APPLE MUSIC"]);
    }
}
