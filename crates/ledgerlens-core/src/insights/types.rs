//! Core types for the insight pipeline

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Version stamped into every persisted report body
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Per-category statistics of debit amounts for one run (never persisted)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryBaseline {
    pub mean: f64,
    /// Sample standard deviation; 0 when fewer than two samples
    pub std_dev: f64,
    pub samples: usize,
}

/// A debit that is unusually large for its category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnomalyRecord {
    pub amount: f64,
    pub category: String,
    pub merchant: String,
    pub narration: String,
    pub date: DateTime<Utc>,
    /// Human-readable explanation naming the category
    pub reason: String,
}

/// Inferred billing cycle of a recurring payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cycle {
    Monthly,
    Quarterly,
    Yearly,
}

impl Cycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cycle::Monthly => "Monthly",
            Cycle::Quarterly => "Quarterly",
            Cycle::Yearly => "Yearly",
        }
    }

    /// Days added to the last payment to predict the next one
    pub fn period_days(&self) -> i64 {
        match self {
            Cycle::Monthly => 30,
            Cycle::Quarterly => 90,
            Cycle::Yearly => 365,
        }
    }

    /// Classify a mean gap between payments; `None` means no known cycle
    pub fn from_mean_gap(days: f64) -> Option<Self> {
        if (26.0..=34.0).contains(&days) {
            Some(Cycle::Monthly)
        } else if (85.0..=95.0).contains(&days) {
            Some(Cycle::Quarterly)
        } else if (350.0..=380.0).contains(&days) {
            Some(Cycle::Yearly)
        } else {
            None
        }
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A detected recurring payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubscriptionRecord {
    /// Normalized (upper-cased, trimmed) merchant name
    pub merchant: String,
    pub average_amount: f64,
    pub cycle: Cycle,
    pub last_payment: DateTime<Utc>,
    pub next_payment: Option<DateTime<Utc>>,
    pub confidence: f64,
}

/// Direction of month-over-month spend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Rising,
    Falling,
    Flat,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Rising => "rising",
            Trend::Falling => "falling",
            Trend::Flat => "flat",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Next-month spend forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictionReport {
    pub predicted_total: f64,
    /// Mean of the historical monthly debit totals
    pub historical_mean: f64,
    pub trend: Trend,
    pub category_predictions: BTreeMap<String, f64>,
    pub category_trends: BTreeMap<String, Trend>,
}

impl Default for PredictionReport {
    fn default() -> Self {
        Self {
            predicted_total: 0.0,
            historical_mean: 0.0,
            trend: Trend::Flat,
            category_predictions: BTreeMap::new(),
            category_trends: BTreeMap::new(),
        }
    }
}

/// Headline numbers for the trailing window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpendSummary {
    pub window_days: i64,
    pub total_debited: f64,
    pub total_credited: f64,
    pub largest_category: Option<String>,
    pub largest_merchant: Option<String>,
    pub average_daily_debit: f64,
}

impl SpendSummary {
    pub fn empty(window_days: i64) -> Self {
        Self {
            window_days,
            total_debited: 0.0,
            total_credited: 0.0,
            largest_category: None,
            largest_merchant: None,
            average_daily_debit: 0.0,
        }
    }
}

/// The report produced for one user on one agent pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InsightReport {
    pub schema_version: u32,
    pub summary: SpendSummary,
    pub patterns: Vec<String>,
    pub alerts: Vec<String>,
    pub subscriptions: Vec<SubscriptionRecord>,
    pub anomalies: Vec<AnomalyRecord>,
    pub prediction: PredictionReport,
    pub recommendations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl InsightReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a persisted report body, rejecting unknown fields and versions
    pub fn from_json(body: &str) -> Result<Self> {
        let report: InsightReport = serde_json::from_str(body)?;
        if report.schema_version != REPORT_SCHEMA_VERSION {
            return Err(Error::InvalidData(format!(
                "Unsupported report schema version {} (expected {})",
                report.schema_version, REPORT_SCHEMA_VERSION
            )));
        }
        Ok(report)
    }
}

/// A report row from the append-only history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredReport {
    pub id: i64,
    pub user_id: String,
    pub generated_at: DateTime<Utc>,
    pub report: InsightReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_from_mean_gap() {
        assert_eq!(Cycle::from_mean_gap(30.0), Some(Cycle::Monthly));
        assert_eq!(Cycle::from_mean_gap(26.0), Some(Cycle::Monthly));
        assert_eq!(Cycle::from_mean_gap(34.5), None);
        assert_eq!(Cycle::from_mean_gap(91.0), Some(Cycle::Quarterly));
        assert_eq!(Cycle::from_mean_gap(365.0), Some(Cycle::Yearly));
        assert_eq!(Cycle::from_mean_gap(7.0), None);
    }

    #[test]
    fn test_trend_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Trend::Rising).unwrap(), "\"rising\"");
        assert_eq!(Trend::Flat.to_string(), "flat");
    }

    #[test]
    fn test_from_json_rejects_unknown_fields() {
        let report = InsightReport {
            schema_version: REPORT_SCHEMA_VERSION,
            summary: SpendSummary::empty(30),
            patterns: vec![],
            alerts: vec![],
            subscriptions: vec![],
            anomalies: vec![],
            prediction: PredictionReport::default(),
            recommendations: vec![],
            generated_at: Utc::now(),
        };
        let mut value = serde_json::to_value(&report).unwrap();
        value["injected"] = serde_json::json!("__import__('os')");

        let err = InsightReport::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_from_json_rejects_other_schema_version() {
        let report = InsightReport {
            schema_version: REPORT_SCHEMA_VERSION + 1,
            summary: SpendSummary::empty(30),
            patterns: vec![],
            alerts: vec![],
            subscriptions: vec![],
            anomalies: vec![],
            prediction: PredictionReport::default(),
            recommendations: vec![],
            generated_at: Utc::now(),
        };
        let err = InsightReport::from_json(&report.to_json().unwrap()).unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }
}
