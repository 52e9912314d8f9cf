use std::ops::Deref;

use super::domain::{FinancialProfile, PricingRequest};

pub const MAX_CREDIT_SCORE: u16 = 1000;
pub const MAX_RISK_SCORE: f64 = 1000.0;

/// Field-level validation failure surfaced to callers with the offending field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid `{field}`: {reason}")]
pub struct InvalidInput {
    pub field: &'static str,
    pub reason: String,
}

impl InvalidInput {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Profile that has passed range and consistency checks.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedProfile<'a>(&'a FinancialProfile);

impl Deref for ValidatedProfile<'_> {
    type Target = FinancialProfile;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

/// Guard responsible for rejecting out-of-range inputs before they reach the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileGuard;

impl ProfileGuard {
    pub fn validate<'a>(
        &self,
        profile: &'a FinancialProfile,
    ) -> Result<ValidatedProfile<'a>, InvalidInput> {
        non_negative("company_age_years", profile.company_age_years)?;
        non_negative("total_debt", profile.total_debt)?;
        non_negative("annual_revenue", profile.annual_revenue)?;
        non_negative("average_daily_balance", profile.average_daily_balance)?;
        non_negative("average_monthly_revenue", profile.average_monthly_revenue)?;
        non_negative("top_client_revenue", profile.top_client_revenue)?;
        non_negative("period_total_revenue", profile.period_total_revenue)?;
        credit_score("personal_credit_score", profile.personal_credit_score)?;
        credit_score("company_credit_score", profile.company_credit_score)?;

        if profile.top_client_revenue > profile.period_total_revenue {
            return Err(InvalidInput::new(
                "top_client_revenue",
                format!(
                    "{:.2} exceeds period_total_revenue {:.2}",
                    profile.top_client_revenue, profile.period_total_revenue
                ),
            ));
        }

        Ok(ValidatedProfile(profile))
    }

    pub fn validate_loan_terms(
        &self,
        term_months: u32,
        requested_amount: f64,
    ) -> Result<(), InvalidInput> {
        if term_months == 0 {
            return Err(InvalidInput::new("term_months", "must be at least 1"));
        }
        if !requested_amount.is_finite() || requested_amount <= 0.0 {
            return Err(InvalidInput::new(
                "requested_amount",
                format!("must be a positive amount (found {requested_amount})"),
            ));
        }
        Ok(())
    }

    pub fn validate_score(&self, field: &'static str, score: f64) -> Result<(), InvalidInput> {
        if !score.is_finite() || !(0.0..=MAX_RISK_SCORE).contains(&score) {
            return Err(InvalidInput::new(
                field,
                format!("must be within 0-{MAX_RISK_SCORE} (found {score})"),
            ));
        }
        Ok(())
    }

    pub fn validate_pricing_request(&self, request: &PricingRequest) -> Result<(), InvalidInput> {
        self.validate_score("final_risk_score", request.final_risk_score)?;
        self.validate_loan_terms(request.term_months, request.requested_amount)
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), InvalidInput> {
    if !value.is_finite() {
        return Err(InvalidInput::new(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(InvalidInput::new(
            field,
            format!("must not be negative (found {value})"),
        ));
    }
    Ok(())
}

fn credit_score(field: &'static str, value: u16) -> Result<(), InvalidInput> {
    if value > MAX_CREDIT_SCORE {
        return Err(InvalidInput::new(
            field,
            format!("must be within 0-{MAX_CREDIT_SCORE} (found {value})"),
        ));
    }
    Ok(())
}
