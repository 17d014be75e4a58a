//! Spend Forecaster
//!
//! Predicts next month's debit total, overall and per category, from
//! calendar-month totals:
//! - No history: 0
//! - One month: repeat it
//! - Two months: linear projection
//! - Three or more: weighted moving average of the last three months plus
//!   the mean month-over-month change

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::models::Transaction;

use super::round2;
use super::types::{PredictionReport, Trend};

/// Last month must move by more than this fraction to count as a trend
const TREND_BAND: f64 = 0.10;

/// Calendar month key; orders chronologically
type MonthKey = (i32, u32);

/// Forecasts next-month spend from monthly debit totals
#[derive(Debug, Clone, Default)]
pub struct SpendForecaster;

impl SpendForecaster {
    pub fn new() -> Self {
        Self
    }

    pub fn predict(&self, transactions: &[Transaction]) -> PredictionReport {
        let monthly = monthly_totals(transactions.iter().filter(|t| t.is_debit()));
        if monthly.is_empty() {
            return PredictionReport::default();
        }

        let values: Vec<f64> = monthly.into_values().collect();
        let historical_mean = values.iter().sum::<f64>() / values.len() as f64;

        let mut category_predictions = BTreeMap::new();
        let mut category_trends = BTreeMap::new();
        for (category, series) in category_series(transactions) {
            category_predictions.insert(category.clone(), round2(predict_next_value(&series)));
            category_trends.insert(category, trend_of(&series));
        }

        PredictionReport {
            predicted_total: round2(predict_next_value(&values)),
            historical_mean: round2(historical_mean),
            trend: trend_of(&values),
            category_predictions,
            category_trends,
        }
    }
}

fn month_of(tx: &Transaction) -> MonthKey {
    (tx.value_date.year(), tx.value_date.month())
}

fn monthly_totals<'a>(txns: impl Iterator<Item = &'a Transaction>) -> BTreeMap<MonthKey, f64> {
    let mut monthly = BTreeMap::new();
    for tx in txns {
        *monthly.entry(month_of(tx)).or_insert(0.0) += tx.amount;
    }
    monthly
}

/// Chronological monthly debit totals per category
fn category_series(transactions: &[Transaction]) -> BTreeMap<String, Vec<f64>> {
    let mut by_category: BTreeMap<&str, BTreeMap<MonthKey, f64>> = BTreeMap::new();
    for tx in transactions.iter().filter(|t| t.is_debit()) {
        *by_category
            .entry(tx.category.as_str())
            .or_default()
            .entry(month_of(tx))
            .or_insert(0.0) += tx.amount;
    }

    by_category
        .into_iter()
        .map(|(category, months)| (category.to_string(), months.into_values().collect()))
        .collect()
}

/// Extrapolate the next value of a chronological series
pub fn predict_next_value(values: &[f64]) -> f64 {
    match values {
        [] => 0.0,
        [only] => *only,
        [first, last] => last + (last - first),
        [.., a, b, c] => {
            let diffs: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
            let slope = diffs.iter().sum::<f64>() / diffs.len() as f64;
            c * 0.6 + b * 0.3 + a * 0.1 + slope
        }
    }
}

/// Compare the last two values of a series
pub fn trend_of(values: &[f64]) -> Trend {
    match values {
        [.., previous, last] => {
            if *last > previous * (1.0 + TREND_BAND) {
                Trend::Rising
            } else if *last < previous * (1.0 - TREND_BAND) {
                Trend::Falling
            } else {
                Trend::Flat
            }
        }
        _ => Trend::Flat,
    }
}
