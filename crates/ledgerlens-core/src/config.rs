//! Agent configuration
//!
//! Thresholds for the analyzers and settings for the agent loop.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a three-layer resolution:
//! 1. An explicit path (`--config`), which must exist
//! 2. The user override (~/.config/ledgerlens/agent.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! Environment variables are applied on top:
//! - `LEDGERLENS_AGENT_INTERVAL`: seconds between passes in continuous mode
//! - `LEDGERLENS_TXN_LIMIT`: transactions loaded per user

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/agent.toml");

pub const INTERVAL_ENV: &str = "LEDGERLENS_AGENT_INTERVAL";
pub const TXN_LIMIT_ENV: &str = "LEDGERLENS_TXN_LIMIT";

/// Thresholds consumed by the analyzers and the aggregator
#[derive(Debug, Clone, PartialEq)]
pub struct InsightConfig {
    /// Trailing window for the spend summary
    pub summary_window_days: i64,
    pub anomaly_std_multiplier: f64,
    pub subscription_amount_tolerance: f64,
    /// Placeholder until a statistical confidence model exists
    pub subscription_confidence: f64,
    pub evening_hour: u32,
    pub evening_share: f64,
    pub food_pattern_threshold: f64,
    pub food_alert_threshold: f64,
    pub transport_alert_threshold: f64,
    pub subscription_cost_threshold: f64,
    pub currency_symbol: String,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            summary_window_days: 30,
            anomaly_std_multiplier: 2.5,
            subscription_amount_tolerance: 0.20,
            subscription_confidence: 0.9,
            evening_hour: 18,
            evening_share: 0.35,
            food_pattern_threshold: 2000.0,
            food_alert_threshold: 3000.0,
            transport_alert_threshold: 2000.0,
            subscription_cost_threshold: 1000.0,
            currency_symbol: "₹".to_string(),
        }
    }
}

/// Full agent configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    /// Most recent transactions loaded per user
    pub transaction_limit: usize,
    /// Sleep between passes in continuous mode
    pub interval: Duration,
    pub insights: InsightConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            transaction_limit: 200,
            interval: Duration::from_secs(60),
            insights: InsightConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Load configuration, then apply environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let content = match explicit {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => match default_config_path().filter(|p| p.exists()) {
                Some(path) => {
                    debug!(path = %path.display(), "Using config override");
                    fs::read_to_string(&path).map_err(|e| {
                        Error::Config(format!("Failed to read {}: {}", path.display(), e))
                    })?
                }
                None => DEFAULT_CONFIG.to_string(),
            },
        };

        let mut config = parse_config(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `LEDGERLENS_*` environment overrides; unparseable values are ignored
    pub fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var(INTERVAL_ENV) {
            match raw.parse::<u64>() {
                Ok(secs) => self.interval = Duration::from_secs(secs),
                Err(_) => warn!("{} is not a number of seconds: {}", INTERVAL_ENV, raw),
            }
        }
        if let Ok(raw) = std::env::var(TXN_LIMIT_ENV) {
            match raw.parse::<usize>() {
                Ok(limit) => self.transaction_limit = limit,
                Err(_) => warn!("{} is not a count: {}", TXN_LIMIT_ENV, raw),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.transaction_limit == 0 {
            return Err(Error::Config("transaction_limit must be positive".into()));
        }
        if self.interval.is_zero() {
            return Err(Error::Config("interval_secs must be positive".into()));
        }
        let t = &self.insights;
        if t.summary_window_days <= 0 {
            return Err(Error::Config("window_days must be positive".into()));
        }
        if !(0.0..=1.0).contains(&t.subscription_amount_tolerance) {
            return Err(Error::Config("amount_tolerance must be within 0..=1".into()));
        }
        if !(0.0..=1.0).contains(&t.subscription_confidence) {
            return Err(Error::Config("confidence must be within 0..=1".into()));
        }
        if t.evening_hour > 23 {
            return Err(Error::Config("evening_hour must be within 0..=23".into()));
        }
        Ok(())
    }
}

/// Default user override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ledgerlens").join("agent.toml"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    agent: Option<RawAgent>,
    summary: Option<RawSummary>,
    anomalies: Option<RawAnomalies>,
    subscriptions: Option<RawSubscriptions>,
    patterns: Option<RawPatterns>,
    alerts: Option<RawAlerts>,
    recommendations: Option<RawRecommendations>,
    display: Option<RawDisplay>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAgent {
    transaction_limit: Option<usize>,
    interval_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSummary {
    window_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAnomalies {
    std_multiplier: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSubscriptions {
    amount_tolerance: Option<f64>,
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPatterns {
    evening_hour: Option<u32>,
    evening_share: Option<f64>,
    food_spend_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAlerts {
    food_threshold: Option<f64>,
    transport_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRecommendations {
    subscription_cost_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDisplay {
    currency_symbol: Option<String>,
}

/// Parse config from TOML content, applying it over the defaults
pub fn parse_config(content: &str) -> Result<AgentConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AgentConfig::default();

    if let Some(agent) = raw.agent {
        if let Some(limit) = agent.transaction_limit {
            config.transaction_limit = limit;
        }
        if let Some(secs) = agent.interval_secs {
            config.interval = Duration::from_secs(secs);
        }
    }

    let t = &mut config.insights;
    if let Some(summary) = raw.summary {
        if let Some(days) = summary.window_days {
            t.summary_window_days = days;
        }
    }
    if let Some(anomalies) = raw.anomalies {
        if let Some(k) = anomalies.std_multiplier {
            t.anomaly_std_multiplier = k;
        }
    }
    if let Some(subs) = raw.subscriptions {
        if let Some(tolerance) = subs.amount_tolerance {
            t.subscription_amount_tolerance = tolerance;
        }
        if let Some(confidence) = subs.confidence {
            t.subscription_confidence = confidence;
        }
    }
    if let Some(patterns) = raw.patterns {
        if let Some(hour) = patterns.evening_hour {
            t.evening_hour = hour;
        }
        if let Some(share) = patterns.evening_share {
            t.evening_share = share;
        }
        if let Some(food) = patterns.food_spend_threshold {
            t.food_pattern_threshold = food;
        }
    }
    if let Some(alerts) = raw.alerts {
        if let Some(food) = alerts.food_threshold {
            t.food_alert_threshold = food;
        }
        if let Some(transport) = alerts.transport_threshold {
            t.transport_alert_threshold = transport;
        }
    }
    if let Some(recs) = raw.recommendations {
        if let Some(cost) = recs.subscription_cost_threshold {
            t.subscription_cost_threshold = cost;
        }
    }
    if let Some(display) = raw.display {
        if let Some(symbol) = display.currency_symbol {
            t.currency_symbol = symbol;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AgentConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = parse_config(
            r#"
            [agent]
            interval_secs = 5

            [anomalies]
            std_multiplier = 3.0
            "#,
        )
        .unwrap();

        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.transaction_limit, 200);
        assert_eq!(config.insights.anomaly_std_multiplier, 3.0);
        assert_eq!(config.insights.food_alert_threshold, 3000.0);
    }

    #[test]
    fn test_unknown_section_rejected() {
        let err = parse_config("[bogus]\nvalue = 1\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_key_in_section_rejected() {
        let err = parse_config("[anomalies]\nstd_multiplyer = 3.0\n").unwrap_err();
        assert!(err.to_string().contains("std_multiplyer"));
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let config = AgentConfig {
            transaction_limit: 0,
            ..AgentConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.toml");
        fs::write(&path, "[summary]\nwindow_days = 14\n").unwrap();

        let config = AgentConfig::load(Some(&path)).unwrap();
        assert_eq!(config.insights.summary_window_days, 14);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(AgentConfig::load(Some(&missing)).is_err());
    }
}
