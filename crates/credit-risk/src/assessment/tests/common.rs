use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::assessment::assessment_router;
use crate::assessment::bureau::{BureauError, BureauGateway, BureauSubject, MockBureau};
use crate::assessment::domain::{ExternalScore, FinancialProfile};
use crate::assessment::engine::RiskEngine;
use crate::assessment::service::{AssessmentService, FullAssessmentRequest};

/// Reference borrower used across the suite; scores roughly 814 under default weights.
pub(super) fn golden_profile() -> FinancialProfile {
    FinancialProfile {
        company_age_years: 3.5,
        personal_credit_score: 750,
        total_debt: 100_000.0,
        annual_revenue: 500_000.0,
        average_daily_balance: 15_000.0,
        average_monthly_revenue: 41_667.0,
        cash_stress_days: 2,
        top_client_revenue: 80_000.0,
        period_total_revenue: 300_000.0,
        company_credit_score: 800,
    }
}

/// Borrower weak on every metric; lands in the automatically reproved band.
pub(super) fn distressed_profile() -> FinancialProfile {
    FinancialProfile {
        company_age_years: 0.0,
        personal_credit_score: 0,
        total_debt: 1_000_000.0,
        annual_revenue: 0.0,
        average_daily_balance: 0.0,
        average_monthly_revenue: 0.0,
        cash_stress_days: 30,
        top_client_revenue: 0.0,
        period_total_revenue: 0.0,
        company_credit_score: 0,
    }
}

pub(super) fn full_request(profile: FinancialProfile) -> FullAssessmentRequest {
    FullAssessmentRequest {
        profile,
        term_months: 12,
        requested_amount: 100_000.0,
    }
}

pub(super) fn engine() -> RiskEngine {
    RiskEngine::with_defaults()
}

pub(super) fn build_service() -> AssessmentService {
    AssessmentService::new(Arc::new(engine()), Arc::new(MockBureau::default()))
}

pub(super) fn offline_service() -> AssessmentService {
    AssessmentService::new(Arc::new(engine()), Arc::new(UnavailableBureau))
}

pub(super) fn router_with_service(service: AssessmentService) -> axum::Router {
    assessment_router(Arc::new(service))
}

#[derive(Debug)]
pub(super) struct UnavailableBureau;

#[async_trait]
impl BureauGateway for UnavailableBureau {
    fn provider(&self) -> &str {
        "offline"
    }

    async fn fetch_external_score(
        &self,
        _subject: &BureauSubject,
    ) -> Result<ExternalScore, BureauError> {
        Err(BureauError::Timeout { timeout_ms: 3_000 })
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
