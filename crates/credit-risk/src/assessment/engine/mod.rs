mod aggregator;
mod bands;
mod config;
mod normalizer;
mod pricing;
mod reconciler;

pub use bands::{band_for, classify};
pub use config::{
    AmountTier, BandPremiums, EngineConfig, EngineConfigError, MetricWeights,
    NormalizationConfig, PricingConfig, ReconciliationConfig, TermTier,
};

use super::domain::{
    BureauLookup, FinancialProfile, InterestRateResult, ReconciledScore, RiskBand, RiskScore,
};
use super::guard::{InvalidInput, ProfileGuard};
use tracing::debug;

/// Failures surfaced by the engine. Rejection is a business outcome, not a fault.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),
    #[error("application rejected: score {score:.2} is automatically reproved")]
    RejectedApplication { score: f64 },
}

/// Stateless engine applying one validated configuration to every request.
#[derive(Debug, Clone)]
pub struct RiskEngine {
    config: EngineConfig,
    guard: ProfileGuard,
}

impl RiskEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            guard: ProfileGuard,
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            config: EngineConfig::default(),
            guard: ProfileGuard,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn compute_risk_score(&self, profile: &FinancialProfile) -> Result<RiskScore, EngineError> {
        let validated = self.guard.validate(profile)?;
        let normalized = normalizer::normalize_profile(&validated, &self.config.normalization);
        let score = aggregator::aggregate(normalized, &self.config.weights);

        debug!(score = score.value, "risk score computed");
        Ok(score)
    }

    pub fn classify(&self, score: &RiskScore) -> RiskBand {
        classify(score)
    }

    pub fn price_loan(
        &self,
        score: &RiskScore,
        band: RiskBand,
        term_months: u32,
        requested_amount: f64,
    ) -> Result<InterestRateResult, EngineError> {
        let result = pricing::price(
            score.value,
            band,
            term_months,
            requested_amount,
            &self.config.pricing,
        )?;

        debug!(
            score = score.value,
            band = band.label(),
            annual_rate = result.annual_rate,
            "loan priced"
        );
        Ok(result)
    }

    pub fn reconcile(&self, internal: &RiskScore, external: &BureauLookup) -> ReconciledScore {
        reconciler::reconcile(internal, external, &self.config.reconciliation)
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
