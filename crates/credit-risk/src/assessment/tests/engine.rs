use super::common::*;
use crate::assessment::domain::{BureauLookup, MetricKind, RiskBand, RiskScore};
use crate::assessment::engine::{EngineConfig, EngineError, RiskEngine};

#[test]
fn golden_profile_scores_in_band_a() {
    let engine = engine();

    let score = engine
        .compute_risk_score(&golden_profile())
        .expect("valid profile");

    assert_eq!(score.value, 814.21);
    assert_eq!(engine.classify(&score), RiskBand::A);
    assert_eq!(score.contributions.len(), MetricKind::ALL.len());
}

#[test]
fn scoring_is_deterministic_including_breakdown() {
    let engine = engine();
    let profile = golden_profile();

    let first = engine.compute_risk_score(&profile).expect("first");
    let second = engine.compute_risk_score(&profile).expect("second");

    assert_eq!(first, second);
}

#[test]
fn contributions_add_up_to_the_score() {
    let score = engine()
        .compute_risk_score(&golden_profile())
        .expect("valid profile");

    let total: f64 = score.contributions.iter().map(|item| item.points).sum();
    assert!((total - score.value).abs() < 0.05, "{total} vs {}", score.value);
    for contribution in &score.contributions {
        assert!((0.0..=1.0).contains(&contribution.normalized));
        assert!(!contribution.notes.is_empty());
    }
}

#[test]
fn higher_personal_credit_never_lowers_the_score() {
    let engine = engine();
    let mut previous = f64::MIN;

    for credit in (0..=1000).step_by(50) {
        let mut profile = golden_profile();
        profile.personal_credit_score = credit;
        let score = engine.compute_risk_score(&profile).expect("valid");
        assert!(
            score.value >= previous,
            "score dropped at personal credit {credit}"
        );
        previous = score.value;
    }
}

#[test]
fn more_debt_never_raises_the_score() {
    let engine = engine();
    let mut previous = f64::MAX;

    for step in 0..20 {
        let mut profile = golden_profile();
        profile.total_debt = f64::from(step) * 75_000.0;
        let score = engine.compute_risk_score(&profile).expect("valid");
        assert!(
            score.value <= previous,
            "score rose at debt {}",
            profile.total_debt
        );
        previous = score.value;
    }
}

#[test]
fn concentrated_revenue_is_penalised() {
    let engine = engine();
    let mut diversified = golden_profile();
    diversified.top_client_revenue = 50_000.0;
    let mut concentrated = golden_profile();
    concentrated.top_client_revenue = 250_000.0;

    let diversified = engine.compute_risk_score(&diversified).expect("valid");
    let concentrated = engine.compute_risk_score(&concentrated).expect("valid");

    assert!(concentrated.value < diversified.value);
    let penalty = concentrated
        .contribution(MetricKind::ClientConcentration)
        .expect("concentration scored");
    assert!(penalty.normalized < 1.0);
}

#[test]
fn zero_period_revenue_scores_concentration_at_worst_case() {
    let engine = engine();
    let mut profile = golden_profile();
    profile.top_client_revenue = 0.0;
    profile.period_total_revenue = 0.0;

    let score = engine.compute_risk_score(&profile).expect("valid");
    let concentration = score
        .contribution(MetricKind::ClientConcentration)
        .expect("concentration scored");

    assert_eq!(
        concentration.normalized,
        engine.config().normalization.risk_floor
    );
}

#[test]
fn rejects_invalid_profiles_with_field_name() {
    let engine = engine();

    let mut negative = golden_profile();
    negative.total_debt = -1.0;
    match engine.compute_risk_score(&negative) {
        Err(EngineError::InvalidInput(invalid)) => assert_eq!(invalid.field, "total_debt"),
        other => panic!("expected invalid input, got {other:?}"),
    }

    let mut out_of_range = golden_profile();
    out_of_range.company_credit_score = 1_200;
    match engine.compute_risk_score(&out_of_range) {
        Err(EngineError::InvalidInput(invalid)) => {
            assert_eq!(invalid.field, "company_credit_score")
        }
        other => panic!("expected invalid input, got {other:?}"),
    }

    let mut inconsistent = golden_profile();
    inconsistent.top_client_revenue = 400_000.0;
    match engine.compute_risk_score(&inconsistent) {
        Err(EngineError::InvalidInput(invalid)) => {
            assert_eq!(invalid.field, "top_client_revenue")
        }
        other => panic!("expected invalid input, got {other:?}"),
    }
}

#[test]
fn golden_quote_for_band_a() {
    let engine = engine();
    let score = engine
        .compute_risk_score(&golden_profile())
        .expect("valid profile");
    let band = engine.classify(&score);

    let quote = engine
        .price_loan(&score, band, 12, 100_000.0)
        .expect("band A is priced");

    assert!((quote.annual_rate - 0.145).abs() < 1e-9);
    assert!(quote.monthly_rate < quote.annual_rate / 12.0 + 1e-9);
    assert!(!quote.components.clamped);
}

#[test]
fn reproved_band_is_never_priced() {
    let engine = engine();
    let score = engine
        .compute_risk_score(&distressed_profile())
        .expect("valid profile");
    let band = engine.classify(&score);
    assert_eq!(band, RiskBand::AutomaticallyReproved);

    for term in [1, 12, 48] {
        let result = engine.price_loan(&score, band, term, 10_000.0);
        assert!(matches!(
            result,
            Err(EngineError::RejectedApplication { .. })
        ));
    }
}

#[test]
fn invalid_terms_win_over_rejection() {
    let engine = engine();
    let score = RiskScore::from_value(100.0);

    let result = engine.price_loan(&score, RiskBand::AutomaticallyReproved, 0, 10_000.0);

    assert!(matches!(result, Err(EngineError::InvalidInput(_))));
}

#[test]
fn unavailable_bureau_keeps_internal_score() {
    let engine = engine();
    let score = engine
        .compute_risk_score(&golden_profile())
        .expect("valid profile");

    let reconciled = engine.reconcile(
        &score,
        &BureauLookup::Unavailable {
            reason: "timeout".to_string(),
        },
    );

    assert!(reconciled.external_unavailable);
    assert!(!reconciled.needs_manual_review);
    assert_eq!(reconciled.blended_score, score.value);
}

#[test]
fn rejects_unbalanced_configuration() {
    let mut config = EngineConfig::default();
    config.weights.set(MetricKind::Leverage, 0.5);

    assert!(RiskEngine::new(config).is_err());
    assert!(RiskEngine::new(EngineConfig::default()).is_ok());
}
