use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::bureau::{BureauError, BureauGateway, BureauSubject};
use super::domain::{
    BureauLookup, ExternalScore, FinancialProfile, InterestRateResult, MetricContribution,
    PricingRequest, ReconciledScore, RiskBand, RiskScore,
};
use super::engine::{EngineError, RiskEngine};
use super::guard::ProfileGuard;

/// Profile plus the loan terms needed to quote a rate in one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullAssessmentRequest {
    #[serde(flatten)]
    pub profile: FinancialProfile,
    pub term_months: u32,
    pub requested_amount: f64,
}

/// Profile plus the company document used to query the bureau.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRequest {
    #[serde(flatten)]
    pub profile: FinancialProfile,
    pub cnpj: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreAssessment {
    pub score: f64,
    pub band: RiskBand,
    pub contributions: Vec<MetricContribution>,
}

impl ScoreAssessment {
    fn new(score: RiskScore, band: RiskBand) -> Self {
        Self {
            score: score.value,
            band,
            contributions: score.contributions,
        }
    }
}

/// Priced offer or business rejection; callers branch on `decision` before reading a rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum PricingDecision {
    Priced(InterestRateResult),
    Rejected { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullAssessment {
    pub score: f64,
    pub band: RiskBand,
    pub contributions: Vec<MetricContribution>,
    pub pricing: PricingDecision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComparison {
    pub subject: BureauSubject,
    pub internal: ScoreAssessment,
    pub bureau: BureauLookup,
    pub reconciliation: ReconciledScore,
    pub guidance: String,
}

/// Error raised by the assessment service.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentServiceError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Bureau(#[from] BureauError),
}

/// Service composing the input guard, scoring engine, and bureau collaborator.
#[derive(Debug, Clone)]
pub struct AssessmentService {
    engine: Arc<RiskEngine>,
    bureau: Arc<dyn BureauGateway>,
    guard: ProfileGuard,
}

impl AssessmentService {
    pub fn new(engine: Arc<RiskEngine>, bureau: Arc<dyn BureauGateway>) -> Self {
        Self {
            engine,
            bureau,
            guard: ProfileGuard,
        }
    }

    pub fn bureau_provider(&self) -> &str {
        self.bureau.provider()
    }

    /// Score and classify a profile.
    pub fn assess(&self, profile: &FinancialProfile) -> Result<ScoreAssessment, EngineError> {
        let score = self.engine.compute_risk_score(profile)?;
        let band = self.engine.classify(&score);
        Ok(ScoreAssessment::new(score, band))
    }

    /// Quote a rate for a score computed earlier; the band is derived from the score.
    pub fn quote(&self, request: &PricingRequest) -> Result<InterestRateResult, EngineError> {
        self.guard.validate_pricing_request(request)?;
        let score = RiskScore::from_value(request.final_risk_score);
        let band = self.engine.classify(&score);
        self.engine
            .price_loan(&score, band, request.term_months, request.requested_amount)
    }

    /// Score, classify, and price in one pass. Rejection is reported as a decision.
    pub fn full_assessment(
        &self,
        request: &FullAssessmentRequest,
    ) -> Result<FullAssessment, EngineError> {
        self.guard
            .validate_loan_terms(request.term_months, request.requested_amount)?;
        let score = self.engine.compute_risk_score(&request.profile)?;
        let band = self.engine.classify(&score);

        let pricing = match self.engine.price_loan(
            &score,
            band,
            request.term_months,
            request.requested_amount,
        ) {
            Ok(rate) => PricingDecision::Priced(rate),
            Err(err @ EngineError::RejectedApplication { .. }) => {
                info!(score = score.value, "application automatically reproved");
                PricingDecision::Rejected {
                    reason: err.to_string(),
                }
            }
            Err(err) => return Err(err),
        };

        Ok(FullAssessment {
            score: score.value,
            band,
            contributions: score.contributions,
            pricing,
        })
    }

    /// Direct bureau lookup; failures are returned to the caller as-is.
    pub async fn lookup(&self, subject: &BureauSubject) -> Result<ExternalScore, BureauError> {
        self.bureau.fetch_external_score(subject).await
    }

    /// Bureau lookup that never fails: errors degrade to `BureauLookup::Unavailable`.
    pub async fn lookup_or_degrade(&self, subject: &BureauSubject) -> BureauLookup {
        let lookup: BureauLookup = self.lookup(subject).await.into();
        if let BureauLookup::Unavailable { reason } = &lookup {
            warn!(%subject, provider = self.bureau.provider(), error = %reason, "bureau unavailable; continuing with internal score");
        }
        lookup
    }

    /// Compare the internal score for a company against its bureau score.
    pub async fn compare(
        &self,
        request: &ComparisonRequest,
    ) -> Result<ScoreComparison, AssessmentServiceError> {
        let subject = BureauSubject::company(&request.cnpj)?;
        let score = self.engine.compute_risk_score(&request.profile)?;
        let band = self.engine.classify(&score);

        let bureau = self.lookup_or_degrade(&subject).await;
        let reconciliation = self.engine.reconcile(&score, &bureau);
        if reconciliation.needs_manual_review {
            info!(
                %subject,
                divergence = reconciliation.divergence,
                "score divergence flagged for manual review"
            );
        }

        Ok(ScoreComparison {
            subject,
            internal: ScoreAssessment::new(score, band),
            bureau,
            guidance: reconciliation.guidance.summary().to_string(),
            reconciliation,
        })
    }
}
