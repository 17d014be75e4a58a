//! Insight pipeline
//!
//! Turns one user's categorized ledger into an [`InsightReport`]:
//!
//! - **Anomaly Detector** - debits far above the category baseline
//! - **Subscription Detector** - recurring payments with a known cycle
//! - **Spend Forecaster** - next-month totals and trends
//! - **Aggregator** - summary, patterns, alerts and recommendations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledgerlens_core::insights::{AnalysisContext, InsightPipeline};
//!
//! let pipeline = InsightPipeline::from_config(&config.insights);
//! let ctx = AnalysisContext::new(&config.insights, clock.now());
//! let report = pipeline.generate(&ctx, &categorized);
//! ```

pub mod aggregator;
pub mod anomalies;
pub mod engine;
pub mod forecast;
pub mod subscriptions;
pub mod types;

pub use aggregator::InsightAggregator;
pub use anomalies::{compute_baselines, AnomalyDetector};
pub use engine::{AnalysisContext, InsightPipeline};
pub use forecast::SpendForecaster;
pub use subscriptions::{normalize_merchant, SubscriptionDetector};
pub use types::{
    AnomalyRecord, CategoryBaseline, Cycle, InsightReport, PredictionReport, SpendSummary,
    StoredReport, SubscriptionRecord, Trend, REPORT_SCHEMA_VERSION,
};

/// Round a currency amount to two decimals
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
