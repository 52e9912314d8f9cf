use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Self-reported financial indicators for one borrower, as submitted with a scoring request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialProfile {
    pub company_age_years: f64,
    pub personal_credit_score: u16,
    pub total_debt: f64,
    pub annual_revenue: f64,
    pub average_daily_balance: f64,
    pub average_monthly_revenue: f64,
    pub cash_stress_days: u32,
    pub top_client_revenue: f64,
    pub period_total_revenue: f64,
    pub company_credit_score: u16,
}

/// Metrics the engine scores, in the order they appear in a breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    CompanyAge,
    PersonalCredit,
    Leverage,
    AnnualRevenue,
    Liquidity,
    CashStress,
    ClientConcentration,
    CompanyCredit,
}

impl MetricKind {
    pub const ALL: [MetricKind; 8] = [
        MetricKind::CompanyAge,
        MetricKind::PersonalCredit,
        MetricKind::Leverage,
        MetricKind::AnnualRevenue,
        MetricKind::Liquidity,
        MetricKind::CashStress,
        MetricKind::ClientConcentration,
        MetricKind::CompanyCredit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::CompanyAge => "company_age",
            MetricKind::PersonalCredit => "personal_credit",
            MetricKind::Leverage => "leverage",
            MetricKind::AnnualRevenue => "annual_revenue",
            MetricKind::Liquidity => "liquidity",
            MetricKind::CashStress => "cash_stress",
            MetricKind::ClientConcentration => "client_concentration",
            MetricKind::CompanyCredit => "company_credit",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Discrete contribution to a risk score, kept for audit trails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricContribution {
    pub metric: MetricKind,
    /// Normalized value in `[0, 1]`.
    pub normalized: f64,
    pub weight: f64,
    /// Share of the 0-1000 score this metric produced.
    pub points: f64,
    pub notes: String,
}

/// Composite score on the 0-1000 scale plus the breakdown that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    pub value: f64,
    pub contributions: Vec<MetricContribution>,
}

impl RiskScore {
    /// Wrap a score computed elsewhere (e.g. a pricing request keyed on a final score).
    pub fn from_value(value: f64) -> Self {
        Self {
            value,
            contributions: Vec::new(),
        }
    }

    pub fn contribution(&self, metric: MetricKind) -> Option<&MetricContribution> {
        self.contributions
            .iter()
            .find(|contribution| contribution.metric == metric)
    }
}

/// Risk bands ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskBand {
    A,
    B,
    C,
    D,
    #[serde(rename = "automatically_reproved")]
    AutomaticallyReproved,
}

impl RiskBand {
    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::A => "A",
            RiskBand::B => "B",
            RiskBand::C => "C",
            RiskBand::D => "D",
            RiskBand::AutomaticallyReproved => "automatically_reproved",
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Rate quote request keyed on an already computed score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    pub final_risk_score: f64,
    pub term_months: u32,
    pub requested_amount: f64,
}

/// Itemized build-up of a quoted rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateComponents {
    pub base_rate: f64,
    pub risk_premium: f64,
    pub term_adjustment: f64,
    pub amount_adjustment: f64,
    pub unclamped_rate: f64,
    pub clamped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestRateResult {
    pub annual_rate: f64,
    pub monthly_rate: f64,
    pub effective_rate_for_term: f64,
    pub term_months: u32,
    pub requested_amount: f64,
    pub band: RiskBand,
    pub components: RateComponents,
}

/// Score reported by a third-party bureau.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalScore {
    pub provider: String,
    pub provider_score: u16,
    pub provider_band: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_probability: Option<f64>,
    #[serde(default)]
    pub raw_payload: Map<String, Value>,
    pub queried_at: DateTime<Utc>,
}

/// Outcome of asking the bureau for a score; failures degrade instead of propagating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BureauLookup {
    Available(ExternalScore),
    Unavailable { reason: String },
}

impl BureauLookup {
    pub fn external(&self) -> Option<&ExternalScore> {
        match self {
            BureauLookup::Available(score) => Some(score),
            BureauLookup::Unavailable { .. } => None,
        }
    }
}

impl<E: fmt::Display> From<Result<ExternalScore, E>> for BureauLookup {
    fn from(value: Result<ExternalScore, E>) -> Self {
        match value {
            Ok(score) => BureauLookup::Available(score),
            Err(err) => BureauLookup::Unavailable {
                reason: err.to_string(),
            },
        }
    }
}

/// Comparative reading of internal vs. bureau scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationGuidance {
    Aligned,
    InternalHigher,
    ExternalHigher,
    ExternalUnavailable,
}

impl ReconciliationGuidance {
    pub fn summary(&self) -> &'static str {
        match self {
            ReconciliationGuidance::Aligned => "scores are aligned; use the blended score",
            ReconciliationGuidance::InternalHigher => {
                "internal score exceeds the bureau; review internal parameters"
            }
            ReconciliationGuidance::ExternalHigher => {
                "bureau score exceeds the internal score; validate external data"
            }
            ReconciliationGuidance::ExternalUnavailable => {
                "bureau unavailable; internal score used on its own"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledScore {
    pub internal_score: f64,
    pub external_score: Option<f64>,
    pub blended_score: f64,
    pub divergence: Option<f64>,
    pub needs_manual_review: bool,
    pub external_unavailable: bool,
    pub guidance: ReconciliationGuidance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unavailable_reason: Option<String>,
}
