use crate::infra::{build_service, read_profile_file, sample_profile};
use clap::Args;
use credit_risk::assessment::{
    AssessmentService, ComparisonRequest, FinancialProfile, FullAssessment,
    FullAssessmentRequest, PricingDecision, ScoreComparison,
};
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file holding a financial profile. Defaults to a built-in sample borrower.
    #[arg(long)]
    pub(crate) profile: Option<PathBuf>,
    /// Loan term in months
    #[arg(long, default_value_t = 12)]
    pub(crate) term: u32,
    /// Requested loan amount
    #[arg(long, default_value_t = 100_000.0)]
    pub(crate) amount: f64,
    /// Emit the assessment as JSON instead of a text summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// JSON file holding a financial profile. Defaults to a built-in sample borrower.
    #[arg(long)]
    pub(crate) profile: Option<PathBuf>,
    /// Company document (CNPJ) to look up at the bureau
    #[arg(long, default_value = "12345678000123")]
    pub(crate) cnpj: String,
    /// Loan term in months
    #[arg(long, default_value_t = 12)]
    pub(crate) term: u32,
    /// Requested loan amount
    #[arg(long, default_value_t = 100_000.0)]
    pub(crate) amount: f64,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        profile,
        term,
        amount,
        json,
    } = args;

    let config = AppConfig::load()?;
    let service = build_service(&config)?;
    let profile = load_profile(profile)?;

    let assessment = assess(&service, profile, term, amount)?;
    if json {
        println!("{}", to_pretty_json(&assessment)?);
    } else {
        render_assessment(&assessment);
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        profile,
        cnpj,
        term,
        amount,
    } = args;

    let config = AppConfig::load()?;
    let service = build_service(&config)?;
    let profile = load_profile(profile)?;

    println!("Credit Risk Engine Demo");
    println!("=======================");
    println!("Bureau provider: {}", service.bureau_provider());
    println!();

    let assessment = assess(&service, profile.clone(), term, amount)?;
    render_assessment(&assessment);
    println!();

    let comparison = service
        .compare(&ComparisonRequest { profile, cnpj })
        .await
        .map_err(|err| AppError::Input(err.to_string()))?;
    render_comparison(&comparison);
    Ok(())
}

fn load_profile(path: Option<PathBuf>) -> Result<FinancialProfile, AppError> {
    match path {
        Some(path) => read_profile_file(&path),
        None => Ok(sample_profile()),
    }
}

fn assess(
    service: &AssessmentService,
    profile: FinancialProfile,
    term_months: u32,
    requested_amount: f64,
) -> Result<FullAssessment, AppError> {
    service
        .full_assessment(&FullAssessmentRequest {
            profile,
            term_months,
            requested_amount,
        })
        .map_err(|err| AppError::Input(err.to_string()))
}

fn to_pretty_json(assessment: &FullAssessment) -> Result<String, AppError> {
    serde_json::to_string_pretty(assessment)
        .map_err(|err| AppError::Input(format!("failed to render assessment ({err})")))
}

fn render_assessment(assessment: &FullAssessment) {
    println!("Risk score: {:.2} (band {})", assessment.score, assessment.band);
    println!("Breakdown:");
    for contribution in &assessment.contributions {
        println!(
            "  - {:<22} {:>7.2} pts  (normalized {:.3}, weight {:.2}) {}",
            contribution.metric.label(),
            contribution.points,
            contribution.normalized,
            contribution.weight,
            contribution.notes
        );
    }

    match &assessment.pricing {
        PricingDecision::Priced(rate) => {
            println!(
                "Annual rate: {:.2}% | monthly {:.3}% | {:.2}% over {} month(s)",
                rate.annual_rate * 100.0,
                rate.monthly_rate * 100.0,
                rate.effective_rate_for_term * 100.0,
                rate.term_months
            );
            let components = &rate.components;
            println!(
                "  base {:.3} + risk {:.3} + term {:.3} + amount {:.3}{}",
                components.base_rate,
                components.risk_premium,
                components.term_adjustment,
                components.amount_adjustment,
                if components.clamped {
                    " (clamped to configured bounds)"
                } else {
                    ""
                }
            );
        }
        PricingDecision::Rejected { reason } => {
            println!("Decision: rejected ({reason})");
        }
    }
}

fn render_comparison(comparison: &ScoreComparison) {
    let reconciliation = &comparison.reconciliation;
    println!("Bureau comparison for {}", comparison.subject);
    match comparison.bureau.external() {
        Some(external) => println!(
            "  bureau score {} (band {}, default probability {})",
            external.provider_score,
            external.provider_band,
            external
                .default_probability
                .map(|probability| format!("{:.1}%", probability * 100.0))
                .unwrap_or_else(|| "n/a".to_string())
        ),
        None => println!(
            "  bureau unavailable: {}",
            reconciliation.unavailable_reason.as_deref().unwrap_or("unknown")
        ),
    }
    println!(
        "  internal {:.2} | blended {:.2}{}",
        reconciliation.internal_score,
        reconciliation.blended_score,
        reconciliation
            .divergence
            .map(|divergence| format!(" | divergence {divergence:.2}"))
            .unwrap_or_default()
    );
    if reconciliation.needs_manual_review {
        println!("  manual review recommended");
    }
    println!("  guidance: {}", comparison.guidance);
}
