//! Derived statistics and risk tiers.

use serde::Serialize;

/// Resistance at or above this value is high risk.
pub const HIGH_RISK_THRESHOLD: f64 = 70.0;

/// Resistance at or above this value (and below high) is moderate risk.
pub const MODERATE_RISK_THRESHOLD: f64 = 30.0;

/// Risk classification of a resistance percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// Resistance >= 70%.
    High,
    /// 30% <= resistance < 70%.
    Moderate,
    /// Resistance < 30%.
    Low,
}

impl RiskTier {
    /// Classify a resistance percentage.
    #[must_use]
    pub fn classify(resistance: f64) -> Self {
        if resistance >= HIGH_RISK_THRESHOLD {
            Self::High
        } else if resistance >= MODERATE_RISK_THRESHOLD {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Label shown next to a bar or in a summary.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High Risk",
            Self::Moderate => "Moderate Risk",
            Self::Low => "Low Risk",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Summary figures over a non-empty collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    /// Number of records.
    pub total: usize,
    /// Mean resistance, rounded to one decimal place.
    pub average: f64,
    /// Highest resistance.
    pub max: f64,
    /// Lowest resistance.
    pub min: f64,
    /// Records in the high tier.
    pub high: usize,
    /// Records in the moderate tier.
    pub moderate: usize,
    /// Records in the low tier.
    pub low: usize,
}

/// Statistics, or the absence of any data to compute them from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Summary {
    /// The collection is empty.
    NoData,
    /// The collection has at least one record.
    Data(Statistics),
}

impl Summary {
    /// Compute a summary over resistance values.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::NoData;
        }

        let mut high = 0;
        let mut moderate = 0;
        let mut low = 0;
        for &value in values {
            match RiskTier::classify(value) {
                RiskTier::High => high += 1,
                RiskTier::Moderate => moderate += 1,
                RiskTier::Low => low += 1,
            }
        }

        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);

        Self::Data(Statistics {
            total: values.len(),
            average: round_one_decimal(mean(values)),
            max,
            min,
            high,
            moderate,
            low,
        })
    }

    /// The statistics, if there is data.
    #[must_use]
    pub fn statistics(&self) -> Option<&Statistics> {
        match self {
            Self::NoData => None,
            Self::Data(stats) => Some(stats),
        }
    }

    /// Whether the summary has no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
