use std::collections::BTreeMap;

use super::super::domain::MetricKind;
use super::super::guard::ValidatedProfile;
use super::config::NormalizationConfig;

/// A metric mapped onto `[0, 1]`, where 1 is the least risky reading.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NormalizedMetric {
    pub value: f64,
    pub notes: String,
}

impl NormalizedMetric {
    fn new(value: f64, notes: String) -> Self {
        Self {
            value: value.clamp(0.0, 1.0),
            notes,
        }
    }
}

pub(crate) fn normalize_profile(
    profile: &ValidatedProfile<'_>,
    config: &NormalizationConfig,
) -> BTreeMap<MetricKind, NormalizedMetric> {
    let mut metrics = BTreeMap::new();

    let age = saturating(profile.company_age_years, config.company_age_scale_years);
    metrics.insert(
        MetricKind::CompanyAge,
        NormalizedMetric::new(
            age,
            format!("{:.1} years in operation", profile.company_age_years),
        ),
    );

    metrics.insert(
        MetricKind::PersonalCredit,
        NormalizedMetric::new(
            credit_curve(profile.personal_credit_score, config.credit_curvature),
            format!("personal credit score {}", profile.personal_credit_score),
        ),
    );

    let leverage = match ratio(profile.total_debt, profile.annual_revenue) {
        Some(leverage) => NormalizedMetric::new(
            decaying(leverage, config.leverage_scale, config.risk_floor),
            format!("debt-to-revenue ratio {leverage:.2}"),
        ),
        None => NormalizedMetric::new(
            config.risk_floor,
            "no annual revenue; leverage scored at floor".to_string(),
        ),
    };
    metrics.insert(MetricKind::Leverage, leverage);

    metrics.insert(
        MetricKind::AnnualRevenue,
        NormalizedMetric::new(
            saturating(profile.annual_revenue, config.revenue_scale),
            format!("annual revenue {:.2}", profile.annual_revenue),
        ),
    );

    let liquidity = match ratio(
        profile.average_daily_balance,
        profile.average_monthly_revenue,
    ) {
        Some(coverage) => NormalizedMetric::new(
            saturating(coverage, config.liquidity_scale),
            format!("daily balance covers {:.0}% of monthly revenue", coverage * 100.0),
        ),
        None => NormalizedMetric::new(
            0.0,
            "no monthly revenue; liquidity scored at zero".to_string(),
        ),
    };
    metrics.insert(MetricKind::Liquidity, liquidity);

    let stress_days = f64::from(profile.cash_stress_days);
    metrics.insert(
        MetricKind::CashStress,
        NormalizedMetric::new(
            decaying(stress_days, config.cash_stress_scale_days, config.risk_floor),
            format!("{} cash stress day(s)", profile.cash_stress_days),
        ),
    );

    let concentration = match ratio(profile.top_client_revenue, profile.period_total_revenue) {
        Some(share) => {
            let value = concentration_curve(share, config);
            let notes = if share <= config.concentration_threshold {
                format!(
                    "top client {:.0}% of period revenue, within {:.0}% threshold",
                    share * 100.0,
                    config.concentration_threshold * 100.0
                )
            } else {
                format!(
                    "top client {:.0}% of period revenue exceeds {:.0}% threshold",
                    share * 100.0,
                    config.concentration_threshold * 100.0
                )
            };
            NormalizedMetric::new(value, notes)
        }
        None => NormalizedMetric::new(
            config.risk_floor,
            "no period revenue; concentration scored at floor".to_string(),
        ),
    };
    metrics.insert(MetricKind::ClientConcentration, concentration);

    metrics.insert(
        MetricKind::CompanyCredit,
        NormalizedMetric::new(
            credit_curve(profile.company_credit_score, config.credit_curvature),
            format!("company credit score {}", profile.company_credit_score),
        ),
    );

    metrics
}

/// `None` when the denominator is zero; callers score that as the metric's worst case.
fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 {
        Some(numerator / denominator)
    } else {
        None
    }
}

/// Increasing with diminishing returns: `1 - e^(-x/scale)`.
fn saturating(value: f64, scale: f64) -> f64 {
    1.0 - (-value.max(0.0) / scale).exp()
}

/// Decreasing toward `floor`: `e^(-x/scale)`.
fn decaying(value: f64, scale: f64, floor: f64) -> f64 {
    (-value.max(0.0) / scale).exp().max(floor)
}

/// Concave map of a 0-1000 score onto `[0, 1]` that hits both endpoints.
fn credit_curve(score: u16, curvature: f64) -> f64 {
    let x = f64::from(score) / 1000.0;
    (1.0 - (-curvature * x).exp()) / (1.0 - (-curvature).exp())
}

fn concentration_curve(share: f64, config: &NormalizationConfig) -> f64 {
    let threshold = config.concentration_threshold;
    if share <= threshold {
        return 1.0;
    }
    let excess = ((share - threshold) / (1.0 - threshold)).min(1.0);
    1.0 - excess * (1.0 - config.risk_floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturating_is_zero_at_origin_and_bounded() {
        assert_eq!(saturating(0.0, 4.0), 0.0);
        assert!(saturating(1e9, 4.0) <= 1.0);
        assert!(saturating(8.0, 4.0) > saturating(4.0, 4.0));
    }

    #[test]
    fn decaying_never_drops_below_floor() {
        assert_eq!(decaying(0.0, 0.6, 0.05), 1.0);
        assert_eq!(decaying(100.0, 0.6, 0.05), 0.05);
    }

    #[test]
    fn credit_curve_hits_endpoints_with_diminishing_returns() {
        assert_eq!(credit_curve(0, 2.0), 0.0);
        assert!((credit_curve(1000, 2.0) - 1.0).abs() < 1e-12);
        let low_gain = credit_curve(200, 2.0) - credit_curve(100, 2.0);
        let high_gain = credit_curve(900, 2.0) - credit_curve(800, 2.0);
        assert!(high_gain < low_gain);
    }

    #[test]
    fn concentration_is_flat_until_threshold_then_declines_to_floor() {
        let config = NormalizationConfig::default();
        assert_eq!(concentration_curve(0.1, &config), 1.0);
        assert_eq!(concentration_curve(0.4, &config), 1.0);
        assert!(concentration_curve(0.7, &config) < 1.0);
        assert!((concentration_curve(1.0, &config) - config.risk_floor).abs() < 1e-12);
    }

    #[test]
    fn zero_denominator_has_no_ratio() {
        assert_eq!(ratio(10.0, 0.0), None);
        assert_eq!(ratio(0.0, 0.0), None);
        assert_eq!(ratio(5.0, 10.0), Some(0.5));
    }
}
