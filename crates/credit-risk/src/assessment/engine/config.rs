use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::super::domain::{MetricKind, RiskBand};

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Tunable coefficients for the whole engine. Every field has a default so partial
/// JSON overrides are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub weights: MetricWeights,
    pub normalization: NormalizationConfig,
    pub pricing: PricingConfig,
    pub reconciliation: ReconciliationConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineConfigError> {
        self.weights.validate()?;
        self.normalization.validate()?;
        self.pricing.validate()?;
        self.reconciliation.validate()
    }
}

/// Metric → weight table. Weights are non-negative and sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricWeights(BTreeMap<MetricKind, f64>);

impl Default for MetricWeights {
    fn default() -> Self {
        Self(BTreeMap::from([
            (MetricKind::CompanyAge, 0.05),
            (MetricKind::PersonalCredit, 0.10),
            (MetricKind::Leverage, 0.15),
            (MetricKind::AnnualRevenue, 0.10),
            (MetricKind::Liquidity, 0.10),
            (MetricKind::CashStress, 0.10),
            (MetricKind::ClientConcentration, 0.05),
            (MetricKind::CompanyCredit, 0.35),
        ]))
    }
}

impl MetricWeights {
    pub fn weight(&self, metric: MetricKind) -> f64 {
        self.0.get(&metric).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, metric: MetricKind, weight: f64) {
        self.0.insert(metric, weight);
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    fn validate(&self) -> Result<(), EngineConfigError> {
        for metric in MetricKind::ALL {
            match self.0.get(&metric) {
                None => return Err(EngineConfigError::MissingWeight(metric)),
                Some(weight) if !weight.is_finite() || *weight < 0.0 => {
                    return Err(EngineConfigError::InvalidWeight {
                        metric,
                        weight: *weight,
                    })
                }
                Some(_) => {}
            }
        }

        let total = self.total();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(EngineConfigError::WeightSum(total));
        }
        Ok(())
    }
}

/// Transfer-function coefficients used by the metric normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Age at which the company-age contribution reaches ~63%.
    pub company_age_scale_years: f64,
    /// Curvature of the concave credit-score curve; larger bends harder.
    pub credit_curvature: f64,
    pub revenue_scale: f64,
    /// Balance-to-monthly-revenue ratio at which liquidity reaches ~63%.
    pub liquidity_scale: f64,
    /// Debt-to-revenue ratio at which the leverage contribution decays to ~37%.
    pub leverage_scale: f64,
    pub cash_stress_scale_days: f64,
    /// Top-client share of period revenue tolerated without penalty.
    pub concentration_threshold: f64,
    /// Lowest contribution a risk-increasing metric can produce.
    pub risk_floor: f64,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            company_age_scale_years: 4.0,
            credit_curvature: 2.0,
            revenue_scale: 500_000.0,
            liquidity_scale: 0.25,
            leverage_scale: 0.6,
            cash_stress_scale_days: 7.0,
            concentration_threshold: 0.4,
            risk_floor: 0.05,
        }
    }
}

impl NormalizationConfig {
    fn validate(&self) -> Result<(), EngineConfigError> {
        positive("company_age_scale_years", self.company_age_scale_years)?;
        positive("credit_curvature", self.credit_curvature)?;
        positive("revenue_scale", self.revenue_scale)?;
        positive("liquidity_scale", self.liquidity_scale)?;
        positive("leverage_scale", self.leverage_scale)?;
        positive("cash_stress_scale_days", self.cash_stress_scale_days)?;
        unit_interval("risk_floor", self.risk_floor)?;
        unit_interval("concentration_threshold", self.concentration_threshold)?;
        if self.concentration_threshold >= 1.0 {
            return Err(EngineConfigError::InvalidCoefficient {
                name: "concentration_threshold",
                value: self.concentration_threshold,
            });
        }
        Ok(())
    }
}

/// Per-band risk premium; the worst band has no entry because it is never priced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandPremiums {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl BandPremiums {
    pub fn for_band(&self, band: RiskBand) -> Option<f64> {
        match band {
            RiskBand::A => Some(self.a),
            RiskBand::B => Some(self.b),
            RiskBand::C => Some(self.c),
            RiskBand::D => Some(self.d),
            RiskBand::AutomaticallyReproved => None,
        }
    }
}

/// Terms up to `max_months` (inclusive) receive `adjustment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermTier {
    pub max_months: u32,
    pub adjustment: f64,
}

/// Amounts of at least `min_amount` receive `adjustment` (a discount when negative).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountTier {
    pub min_amount: f64,
    pub adjustment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub base_rate: f64,
    pub risk_premiums: BandPremiums,
    pub term_tiers: Vec<TermTier>,
    /// Adjustment for terms beyond the last tier.
    pub term_cap: f64,
    pub amount_tiers: Vec<AmountTier>,
    pub amount_floor: f64,
    pub min_rate: f64,
    pub max_rate: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_rate: 0.12,
            risk_premiums: BandPremiums {
                a: 0.01,
                b: 0.04,
                c: 0.08,
                d: 0.14,
            },
            term_tiers: vec![
                TermTier {
                    max_months: 6,
                    adjustment: 0.0,
                },
                TermTier {
                    max_months: 12,
                    adjustment: 0.02,
                },
                TermTier {
                    max_months: 18,
                    adjustment: 0.04,
                },
            ],
            term_cap: 0.06,
            amount_tiers: vec![
                AmountTier {
                    min_amount: 0.0,
                    adjustment: 0.0,
                },
                AmountTier {
                    min_amount: 50_000.0,
                    adjustment: -0.005,
                },
                AmountTier {
                    min_amount: 150_000.0,
                    adjustment: -0.01,
                },
                AmountTier {
                    min_amount: 300_000.0,
                    adjustment: -0.015,
                },
            ],
            amount_floor: -0.015,
            min_rate: 0.10,
            max_rate: 0.35,
        }
    }
}

impl PricingConfig {
    fn validate(&self) -> Result<(), EngineConfigError> {
        finite("base_rate", self.base_rate)?;
        finite("term_cap", self.term_cap)?;
        finite("amount_floor", self.amount_floor)?;
        positive("min_rate", self.min_rate)?;
        finite("max_rate", self.max_rate)?;
        if self.min_rate > self.max_rate {
            return Err(EngineConfigError::RateBounds {
                min: self.min_rate,
                max: self.max_rate,
            });
        }

        let premiums = &self.risk_premiums;
        for (name, value) in [
            ("risk_premiums.a", premiums.a),
            ("risk_premiums.b", premiums.b),
            ("risk_premiums.c", premiums.c),
            ("risk_premiums.d", premiums.d),
        ] {
            finite(name, value)?;
        }
        if !(premiums.a < premiums.b && premiums.b < premiums.c && premiums.c < premiums.d) {
            return Err(EngineConfigError::PremiumOrdering);
        }

        let mut previous: Option<&TermTier> = None;
        for tier in &self.term_tiers {
            finite("term_tiers.adjustment", tier.adjustment)?;
            if tier.adjustment > self.term_cap {
                return Err(EngineConfigError::TermTiers);
            }
            if let Some(prev) = previous {
                if tier.max_months <= prev.max_months || tier.adjustment < prev.adjustment {
                    return Err(EngineConfigError::TermTiers);
                }
            }
            previous = Some(tier);
        }

        let mut previous: Option<&AmountTier> = None;
        for tier in &self.amount_tiers {
            finite("amount_tiers.min_amount", tier.min_amount)?;
            finite("amount_tiers.adjustment", tier.adjustment)?;
            if let Some(prev) = previous {
                if tier.min_amount <= prev.min_amount || tier.adjustment > prev.adjustment {
                    return Err(EngineConfigError::AmountTiers);
                }
            }
            previous = Some(tier);
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// Share of the blended score taken from the internal score.
    pub internal_weight: f64,
    /// Divergence above which the result is flagged for manual review.
    pub review_threshold: f64,
    /// Divergence at or below which the two scores are reported as aligned.
    pub alignment_tolerance: f64,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            internal_weight: 0.5,
            review_threshold: 150.0,
            alignment_tolerance: 50.0,
        }
    }
}

impl ReconciliationConfig {
    fn validate(&self) -> Result<(), EngineConfigError> {
        unit_interval("internal_weight", self.internal_weight)?;
        if !self.review_threshold.is_finite() || self.review_threshold < 0.0 {
            return Err(EngineConfigError::InvalidCoefficient {
                name: "review_threshold",
                value: self.review_threshold,
            });
        }
        if !self.alignment_tolerance.is_finite()
            || self.alignment_tolerance < 0.0
            || self.alignment_tolerance > self.review_threshold
        {
            return Err(EngineConfigError::InvalidCoefficient {
                name: "alignment_tolerance",
                value: self.alignment_tolerance,
            });
        }
        Ok(())
    }
}

/// Reasons a loaded engine configuration is refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineConfigError {
    #[error("weight table is missing `{0}`")]
    MissingWeight(MetricKind),
    #[error("weight for `{metric}` must be a non-negative number (found {weight})")]
    InvalidWeight { metric: MetricKind, weight: f64 },
    #[error("weights must sum to 1.0 (found {0:.6})")]
    WeightSum(f64),
    #[error("`{name}` is out of range (found {value})")]
    InvalidCoefficient { name: &'static str, value: f64 },
    #[error("min_rate {min} exceeds max_rate {max}")]
    RateBounds { min: f64, max: f64 },
    #[error("risk premiums must strictly increase from band A to band D")]
    PremiumOrdering,
    #[error("term tiers must increase in months, never decrease in adjustment, and stay within the cap")]
    TermTiers,
    #[error("amount tiers must increase in amount and never increase in adjustment")]
    AmountTiers,
}

fn finite(name: &'static str, value: f64) -> Result<(), EngineConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineConfigError::InvalidCoefficient { name, value })
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), EngineConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(EngineConfigError::InvalidCoefficient { name, value })
    }
}

fn unit_interval(name: &'static str, value: f64) -> Result<(), EngineConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EngineConfigError::InvalidCoefficient { name, value })
    }
}
