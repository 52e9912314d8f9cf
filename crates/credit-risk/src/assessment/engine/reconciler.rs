use super::super::domain::{BureauLookup, ReconciledScore, ReconciliationGuidance, RiskScore};
use super::aggregator::round_cents;
use super::config::ReconciliationConfig;

pub(crate) fn reconcile(
    internal: &RiskScore,
    external: &BureauLookup,
    config: &ReconciliationConfig,
) -> ReconciledScore {
    let external_score = match external {
        BureauLookup::Available(score) => f64::from(score.provider_score),
        BureauLookup::Unavailable { reason } => {
            return ReconciledScore {
                internal_score: internal.value,
                external_score: None,
                blended_score: internal.value,
                divergence: None,
                needs_manual_review: false,
                external_unavailable: true,
                guidance: ReconciliationGuidance::ExternalUnavailable,
                unavailable_reason: Some(reason.clone()),
            }
        }
    };

    let divergence = round_cents((internal.value - external_score).abs());
    let blended_score = round_cents(
        config.internal_weight * internal.value + (1.0 - config.internal_weight) * external_score,
    );

    let guidance = if divergence < config.alignment_tolerance {
        ReconciliationGuidance::Aligned
    } else if internal.value > external_score {
        ReconciliationGuidance::InternalHigher
    } else {
        ReconciliationGuidance::ExternalHigher
    };

    ReconciledScore {
        internal_score: internal.value,
        external_score: Some(external_score),
        blended_score,
        divergence: Some(divergence),
        needs_manual_review: divergence > config.review_threshold,
        external_unavailable: false,
        guidance,
        unavailable_reason: None,
    }
}
