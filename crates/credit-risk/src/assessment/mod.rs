//! Credit risk scoring, band classification, loan pricing, and bureau reconciliation.
//!
//! Requests flow through [`ProfileGuard`] into the [`RiskEngine`], which is a pure function of
//! its [`EngineConfig`]. Bureau lookups sit behind [`BureauGateway`] so the engine never
//! depends on network availability.

pub mod bureau;
pub mod domain;
pub mod engine;
pub mod guard;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use bureau::{
    gateway_from_config, BureauError, BureauGateway, BureauSubject, HttpBureau, MockBureau,
};
pub use domain::{
    BureauLookup, ExternalScore, FinancialProfile, InterestRateResult, MetricContribution,
    MetricKind, PricingRequest, RateComponents, ReconciledScore, ReconciliationGuidance,
    RiskBand, RiskScore,
};
pub use engine::{
    band_for, EngineConfig, EngineConfigError, EngineError, MetricWeights, NormalizationConfig,
    PricingConfig, ReconciliationConfig, RiskEngine,
};
pub use guard::{InvalidInput, ProfileGuard};
pub use router::assessment_router;
pub use service::{
    AssessmentService, AssessmentServiceError, ComparisonRequest, FullAssessment,
    FullAssessmentRequest, PricingDecision, ScoreAssessment, ScoreComparison,
};
