use std::collections::BTreeMap;

use super::super::domain::{MetricContribution, MetricKind, RiskScore};
use super::config::MetricWeights;
use super::normalizer::NormalizedMetric;

pub(crate) const SCORE_SCALE: f64 = 1000.0;

/// Weighted sum of normalized metrics rescaled to 0-1000, rounded to cents.
pub(crate) fn aggregate(
    normalized: BTreeMap<MetricKind, NormalizedMetric>,
    weights: &MetricWeights,
) -> RiskScore {
    let mut contributions = Vec::with_capacity(normalized.len());
    let mut total = 0.0;

    for (metric, NormalizedMetric { value, notes }) in normalized {
        let weight = weights.weight(metric);
        let points = value * weight * SCORE_SCALE;
        total += points;
        contributions.push(MetricContribution {
            metric,
            normalized: value,
            weight,
            points: round_cents(points),
            notes,
        });
    }

    RiskScore {
        value: round_cents(total.clamp(0.0, SCORE_SCALE)),
        contributions,
    }
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
