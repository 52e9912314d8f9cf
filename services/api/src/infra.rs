use credit_risk::assessment::{
    gateway_from_config, AssessmentService, FinancialProfile, RiskEngine,
};
use credit_risk::config::AppConfig;
use credit_risk::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) bureau_provider: String,
}

/// Wire the engine and bureau selected by configuration into one service.
pub(crate) fn build_service(config: &AppConfig) -> Result<Arc<AssessmentService>, AppError> {
    let engine = RiskEngine::new(config.engine_config()?)?;
    let bureau = gateway_from_config(&config.bureau)?;
    Ok(Arc::new(AssessmentService::new(Arc::new(engine), bureau)))
}

/// Mid-sized borrower used by the CLI when no profile file is given.
pub(crate) fn sample_profile() -> FinancialProfile {
    FinancialProfile {
        company_age_years: 5.0,
        personal_credit_score: 750,
        total_debt: 150_000.0,
        annual_revenue: 800_000.0,
        average_daily_balance: 25_000.0,
        average_monthly_revenue: 66_667.0,
        cash_stress_days: 3,
        top_client_revenue: 120_000.0,
        period_total_revenue: 600_000.0,
        company_credit_score: 700,
    }
}

pub(crate) fn read_profile_file(path: &Path) -> Result<FinancialProfile, AppError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|err| {
        AppError::Input(format!(
            "failed to parse profile '{}' ({err})",
            path.display()
        ))
    })
}
