use super::super::domain::{RiskBand, RiskScore};

/// Lower bounds (exclusive) for each priced band, best band first.
const BAND_THRESHOLDS: [(f64, RiskBand); 4] = [
    (800.0, RiskBand::A),
    (600.0, RiskBand::B),
    (400.0, RiskBand::C),
    (200.0, RiskBand::D),
];

/// Map a raw score to its band. A score equal to a threshold stays in the lower band.
pub fn band_for(score: f64) -> RiskBand {
    BAND_THRESHOLDS
        .iter()
        .find(|(threshold, _)| score > *threshold)
        .map(|(_, band)| *band)
        .unwrap_or(RiskBand::AutomaticallyReproved)
}

pub fn classify(score: &RiskScore) -> RiskBand {
    band_for(score.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_belong_to_the_lower_band() {
        assert_eq!(band_for(800.0), RiskBand::B);
        assert_eq!(band_for(800.0001), RiskBand::A);
        assert_eq!(band_for(600.0), RiskBand::C);
        assert_eq!(band_for(600.0001), RiskBand::B);
        assert_eq!(band_for(400.0), RiskBand::D);
        assert_eq!(band_for(400.0001), RiskBand::C);
        assert_eq!(band_for(200.0), RiskBand::AutomaticallyReproved);
        assert_eq!(band_for(200.0001), RiskBand::D);
    }

    #[test]
    fn extremes_map_to_outer_bands() {
        assert_eq!(band_for(1000.0), RiskBand::A);
        assert_eq!(band_for(0.0), RiskBand::AutomaticallyReproved);
        assert_eq!(band_for(f64::NAN), RiskBand::AutomaticallyReproved);
    }

    #[test]
    fn bands_are_ordered_by_severity() {
        assert!(RiskBand::A < RiskBand::B);
        assert!(RiskBand::D < RiskBand::AutomaticallyReproved);
        assert_eq!(classify(&RiskScore::from_value(650.0)), RiskBand::B);
    }
}
