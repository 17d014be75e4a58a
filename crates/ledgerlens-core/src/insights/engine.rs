//! Insight Pipeline - runs the analyzers and composes one report

use chrono::{DateTime, Utc};

use crate::config::InsightConfig;
use crate::models::{Transaction, UNCATEGORIZED};

use super::aggregator::InsightAggregator;
use super::anomalies::AnomalyDetector;
use super::forecast::SpendForecaster;
use super::subscriptions::SubscriptionDetector;
use super::types::InsightReport;

/// Context provided to the analyzers and the aggregator
pub struct AnalysisContext<'a> {
    /// Thresholds and display settings
    pub config: &'a InsightConfig,
    /// Reference time for the trailing window and the report timestamp
    pub now: DateTime<Utc>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(config: &'a InsightConfig, now: DateTime<Utc>) -> Self {
        Self { config, now }
    }
}

/// The analyzers wired together in their fixed order
#[derive(Debug, Clone)]
pub struct InsightPipeline {
    anomalies: AnomalyDetector,
    subscriptions: SubscriptionDetector,
    forecaster: SpendForecaster,
}

impl Default for InsightPipeline {
    fn default() -> Self {
        Self::from_config(&InsightConfig::default())
    }
}

impl InsightPipeline {
    pub fn from_config(config: &InsightConfig) -> Self {
        Self {
            anomalies: AnomalyDetector::new(config.anomaly_std_multiplier),
            subscriptions: SubscriptionDetector::new(
                config.subscription_amount_tolerance,
                config.subscription_confidence,
            ),
            forecaster: SpendForecaster::new(),
        }
    }

    /// Analyze categorized transactions and build the report
    pub fn generate(
        &self,
        ctx: &AnalysisContext<'_>,
        transactions: &[Transaction],
    ) -> InsightReport {
        debug_assert!(
            transactions.iter().all(|t| t.category != UNCATEGORIZED),
            "transactions must be categorized before analysis"
        );

        let anomalies = self.anomalies.detect(transactions);
        let subscriptions = self.subscriptions.detect(transactions);
        let prediction = self.forecaster.predict(transactions);

        tracing::debug!(
            transactions = transactions.len(),
            anomalies = anomalies.len(),
            subscriptions = subscriptions.len(),
            "Insight analysis complete"
        );

        InsightAggregator::new(ctx).compose(transactions, subscriptions, anomalies, prediction)
    }
}
