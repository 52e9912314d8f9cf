use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};

use super::{BureauError, BureauGateway, BureauSubject};
use crate::assessment::domain::ExternalScore;
use crate::assessment::engine::band_for;

const SECTORS: [&str; 3] = ["retail", "services", "manufacturing"];
const COMPANY_SIZES: [&str; 4] = ["micro", "small", "medium", "large"];
const MARITAL_STATUSES: [&str; 4] = ["single", "married", "divorced", "widowed"];

#[derive(Debug, Clone)]
struct MockRecord {
    score: u16,
    band: String,
    default_probability: f64,
    attributes: Map<String, Value>,
}

/// Offline bureau backed by a small fixed catalogue. Unknown documents get synthetic data
/// seeded from the document itself, so repeated lookups agree.
#[derive(Debug, Clone)]
pub struct MockBureau {
    catalogue: BTreeMap<String, MockRecord>,
}

impl MockBureau {
    pub const PROVIDER: &'static str = "mock-bureau";

    pub fn empty() -> Self {
        Self {
            catalogue: BTreeMap::new(),
        }
    }

    pub fn with_record(
        mut self,
        document: &str,
        score: u16,
        band: &str,
        default_probability: f64,
    ) -> Self {
        let record = Self::fixture(score, band, default_probability, Value::Null);
        self.insert_fixture(document, record)
    }

    fn insert_fixture(mut self, document: &str, record: MockRecord) -> Self {
        self.catalogue.insert(document.to_string(), record);
        self
    }

    fn fixture(
        score: u16,
        band: &str,
        default_probability: f64,
        attributes: Value,
    ) -> MockRecord {
        MockRecord {
            score,
            band: band.to_string(),
            default_probability,
            attributes: match attributes {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }

    fn synthetic(subject: &BureauSubject) -> MockRecord {
        let seed = subject
            .document()
            .bytes()
            .fold(0u64, |acc, byte| acc.wrapping_mul(31).wrapping_add(u64::from(byte)));
        let mut rng = StdRng::seed_from_u64(seed);

        let (score, attributes) = match subject {
            BureauSubject::Company(_) => {
                let score: u16 = rng.gen_range(300..=900);
                let attributes = json!({
                    "sector": SECTORS.choose(&mut rng).copied().unwrap_or("services"),
                    "size": COMPANY_SIZES.choose(&mut rng).copied().unwrap_or("small"),
                    "years_active": rng.gen_range(1..=20),
                });
                (score, attributes)
            }
            BureauSubject::Person(_) => {
                let score: u16 = rng.gen_range(200..=950);
                let attributes = json!({
                    "age": rng.gen_range(18..=70),
                    "monthly_income": rng.gen_range(1_500..=15_000),
                    "marital_status": MARITAL_STATUSES.choose(&mut rng).copied().unwrap_or("single"),
                });
                (score, attributes)
            }
        };

        let default_probability = (rng.gen_range(0.02..0.50_f64) * 1000.0).round() / 1000.0;
        let band = band_for(f64::from(score)).label().to_string();
        Self::fixture(score, &band, default_probability, attributes)
    }
}

impl Default for MockBureau {
    fn default() -> Self {
        Self::empty()
            .insert_fixture(
                "12345678000123",
                Self::fixture(
                    750,
                    "B",
                    0.15,
                    json!({ "sector": "retail", "size": "medium", "years_active": 8 }),
                ),
            )
            .insert_fixture(
                "98765432000198",
                Self::fixture(
                    450,
                    "D",
                    0.35,
                    json!({ "sector": "services", "size": "small", "years_active": 3 }),
                ),
            )
            .insert_fixture(
                "12345678901",
                Self::fixture(
                    820,
                    "A",
                    0.08,
                    json!({ "age": 35, "monthly_income": 8500, "marital_status": "married" }),
                ),
            )
            .insert_fixture(
                "98765432109",
                Self::fixture(
                    380,
                    "D",
                    0.42,
                    json!({ "age": 25, "monthly_income": 2200, "marital_status": "single" }),
                ),
            )
    }
}

#[async_trait]
impl BureauGateway for MockBureau {
    fn provider(&self) -> &str {
        Self::PROVIDER
    }

    async fn fetch_external_score(
        &self,
        subject: &BureauSubject,
    ) -> Result<ExternalScore, BureauError> {
        let (record, catalogued) = match self.catalogue.get(subject.document()) {
            Some(record) => (record.clone(), true),
            None => (Self::synthetic(subject), false),
        };

        let queried_at = Utc::now();
        let mut raw_payload = Map::new();
        raw_payload.insert(
            subject.document_field().to_string(),
            Value::String(subject.document().to_string()),
        );
        raw_payload.insert("attributes".to_string(), Value::Object(record.attributes));
        raw_payload.insert("catalogued".to_string(), Value::Bool(catalogued));
        raw_payload.insert("source".to_string(), Value::String(Self::PROVIDER.to_string()));

        Ok(ExternalScore {
            provider: Self::PROVIDER.to_string(),
            provider_score: record.score,
            provider_band: record.band,
            default_probability: Some(record.default_probability),
            raw_payload,
            queried_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_catalogued_company() {
        let bureau = MockBureau::default();
        let subject = BureauSubject::company("12345678000123").expect("valid");

        let score = bureau.fetch_external_score(&subject).await.expect("found");

        assert_eq!(score.provider_score, 750);
        assert_eq!(score.provider_band, "B");
        assert_eq!(score.default_probability, Some(0.15));
        assert_eq!(score.raw_payload["catalogued"], Value::Bool(true));
        assert_eq!(score.raw_payload["attributes"]["sector"], "retail");
    }

    #[tokio::test]
    async fn synthetic_scores_are_stable_and_in_range() {
        let bureau = MockBureau::default();
        let subject = BureauSubject::person("11122233344").expect("valid");

        let first = bureau.fetch_external_score(&subject).await.expect("first");
        let second = bureau.fetch_external_score(&subject).await.expect("second");

        assert_eq!(first.provider_score, second.provider_score);
        assert_eq!(first.provider_band, second.provider_band);
        assert!((200..=950).contains(&first.provider_score));
        assert_eq!(first.raw_payload["catalogued"], Value::Bool(false));
    }

    #[tokio::test]
    async fn custom_records_override_defaults() {
        let bureau = MockBureau::empty().with_record("12345678000123", 610, "C", 0.2);
        let subject = BureauSubject::company("12345678000123").expect("valid");

        let score = bureau.fetch_external_score(&subject).await.expect("found");

        assert_eq!(score.provider_score, 610);
        assert_eq!(score.provider_band, "C");
    }
}
