use super::super::domain::{InterestRateResult, RateComponents, RiskBand};
use super::super::guard::ProfileGuard;
use super::config::PricingConfig;
use super::EngineError;

const MONTHS_PER_YEAR: f64 = 12.0;

/// Price a loan for an already classified score.
///
/// Input checks run before the band check so malformed requests are never reported as
/// business rejections.
pub(crate) fn price(
    score: f64,
    band: RiskBand,
    term_months: u32,
    requested_amount: f64,
    config: &PricingConfig,
) -> Result<InterestRateResult, EngineError> {
    let guard = ProfileGuard;
    guard.validate_score("score", score)?;
    guard.validate_loan_terms(term_months, requested_amount)?;

    let risk_premium = config
        .risk_premiums
        .for_band(band)
        .ok_or(EngineError::RejectedApplication { score })?;

    let term_adjustment = term_adjustment(term_months, config);
    let amount_adjustment = amount_adjustment(requested_amount, config);

    let unclamped_rate = config.base_rate + risk_premium + term_adjustment + amount_adjustment;
    let annual_rate = unclamped_rate.clamp(config.min_rate, config.max_rate);
    let clamped = annual_rate != unclamped_rate;

    let monthly_rate = (1.0 + annual_rate).powf(1.0 / MONTHS_PER_YEAR) - 1.0;
    let effective_rate_for_term =
        (1.0 + annual_rate).powf(f64::from(term_months) / MONTHS_PER_YEAR) - 1.0;

    Ok(InterestRateResult {
        annual_rate,
        monthly_rate,
        effective_rate_for_term,
        term_months,
        requested_amount,
        band,
        components: RateComponents {
            base_rate: config.base_rate,
            risk_premium,
            term_adjustment,
            amount_adjustment,
            unclamped_rate,
            clamped,
        },
    })
}

fn term_adjustment(term_months: u32, config: &PricingConfig) -> f64 {
    config
        .term_tiers
        .iter()
        .find(|tier| term_months <= tier.max_months)
        .map(|tier| tier.adjustment)
        .unwrap_or(config.term_cap)
}

fn amount_adjustment(requested_amount: f64, config: &PricingConfig) -> f64 {
    config
        .amount_tiers
        .iter()
        .rev()
        .find(|tier| requested_amount >= tier.min_amount)
        .map(|tier| tier.adjustment)
        .unwrap_or(0.0)
        .max(config.amount_floor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PricingConfig {
        PricingConfig::default()
    }

    #[test]
    fn sums_components_for_priced_bands() {
        let result = price(850.0, RiskBand::A, 12, 100_000.0, &config()).expect("priced");
        assert!((result.annual_rate - 0.145).abs() < 1e-12);
        assert_eq!(result.components.risk_premium, 0.01);
        assert_eq!(result.components.term_adjustment, 0.02);
        assert_eq!(result.components.amount_adjustment, -0.005);
        assert!(!result.components.clamped);
        assert!((result.effective_rate_for_term - result.annual_rate).abs() < 1e-12);
    }

    #[test]
    fn automatically_reproved_is_rejected() {
        let err = price(150.0, RiskBand::AutomaticallyReproved, 12, 10_000.0, &config())
            .expect_err("rejected");
        assert!(matches!(err, EngineError::RejectedApplication { score } if score == 150.0));
    }

    #[test]
    fn invalid_terms_win_over_rejection() {
        let err = price(150.0, RiskBand::AutomaticallyReproved, 0, 10_000.0, &config())
            .expect_err("invalid");
        assert!(matches!(err, EngineError::InvalidInput(ref input) if input.field == "term_months"));

        let err = price(700.0, RiskBand::B, 12, 0.0, &config()).expect_err("invalid");
        assert!(
            matches!(err, EngineError::InvalidInput(ref input) if input.field == "requested_amount")
        );
    }

    #[test]
    fn term_adjustment_grows_with_term_up_to_cap() {
        let config = config();
        let adjustments: Vec<f64> = [1, 6, 7, 12, 18, 24, 120]
            .into_iter()
            .map(|term| term_adjustment(term, &config))
            .collect();
        assert!(adjustments.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(term_adjustment(120, &config), config.term_cap);
    }

    #[test]
    fn amount_adjustment_discounts_larger_amounts_down_to_floor() {
        let config = config();
        assert_eq!(amount_adjustment(10_000.0, &config), 0.0);
        assert_eq!(amount_adjustment(200_000.0, &config), -0.01);
        assert_eq!(amount_adjustment(5_000_000.0, &config), config.amount_floor);
    }

    #[test]
    fn clamps_to_configured_bounds() {
        let mut config = config();
        config.max_rate = 0.2;
        let result = price(300.0, RiskBand::D, 36, 1_000.0, &config).expect("priced");
        assert_eq!(result.annual_rate, 0.2);
        assert!(result.components.clamped);
        assert!(result.components.unclamped_rate > 0.2);
    }

    #[test]
    fn better_bands_never_cost_more() {
        let config = config();
        let rates: Vec<f64> = [RiskBand::A, RiskBand::B, RiskBand::C, RiskBand::D]
            .into_iter()
            .map(|band| {
                price(500.0, band, 12, 80_000.0, &config)
                    .expect("priced")
                    .annual_rate
            })
            .collect();
        assert!(rates.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
