use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{BureauError, BureauGateway, BureauSubject};
use crate::assessment::domain::ExternalScore;
use crate::assessment::guard::MAX_CREDIT_SCORE;

const COMPANY_ANALYSIS_PATH: &str = "/v1/empresas/analise";
const PERSON_ANALYSIS_PATH: &str = "/v1/pessoas/analise";
const ANALYSIS_DEPTH: &str = "completa";

/// Fields the engine relies on; everything else is kept verbatim in `raw_payload`.
#[derive(Debug, Deserialize)]
struct AnalysisResponse {
    score: i64,
    faixa: String,
    #[serde(default)]
    probabilidade_inadimplencia: Option<f64>,
}

/// Live bureau client issuing one bounded POST per lookup.
#[derive(Debug, Clone)]
pub struct HttpBureau {
    client: Client,
    base_url: String,
    api_token: Option<String>,
    timeout_ms: u64,
}

impl HttpBureau {
    pub const PROVIDER: &'static str = "http-bureau";

    pub fn new(
        base_url: &str,
        api_token: Option<String>,
        timeout_ms: u64,
    ) -> Result<Self, BureauError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|err| BureauError::Client(err.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
            timeout_ms,
        })
    }

    fn endpoint(&self, subject: &BureauSubject) -> String {
        let path = match subject {
            BureauSubject::Company(_) => COMPANY_ANALYSIS_PATH,
            BureauSubject::Person(_) => PERSON_ANALYSIS_PATH,
        };
        format!("{}{}", self.base_url, path)
    }

    fn map_reqwest_error(&self, err: reqwest::Error) -> BureauError {
        if err.is_timeout() {
            BureauError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            BureauError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl BureauGateway for HttpBureau {
    fn provider(&self) -> &str {
        Self::PROVIDER
    }

    async fn fetch_external_score(
        &self,
        subject: &BureauSubject,
    ) -> Result<ExternalScore, BureauError> {
        let payload = json!({
            subject.document_field(): subject.document(),
            "tipo_analise": ANALYSIS_DEPTH,
        });

        let mut request = self.client.post(self.endpoint(subject)).json(&payload);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| self.map_reqwest_error(err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BureauError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| self.map_reqwest_error(err))?;
        let raw_payload = match &body {
            Value::Object(map) => map.clone(),
            other => {
                return Err(BureauError::InvalidResponse(format!(
                    "expected a JSON object, found {other}"
                )))
            }
        };

        let parsed: AnalysisResponse = serde_json::from_value(body)
            .map_err(|err| BureauError::InvalidResponse(err.to_string()))?;

        let provider_score = u16::try_from(parsed.score)
            .ok()
            .filter(|score| *score <= MAX_CREDIT_SCORE)
            .ok_or_else(|| {
                BureauError::InvalidResponse(format!("score {} outside 0-1000", parsed.score))
            })?;

        let default_probability = match parsed.probabilidade_inadimplencia {
            Some(probability) if !(0.0..=1.0).contains(&probability) => {
                return Err(BureauError::InvalidResponse(format!(
                    "default probability {probability} outside 0-1"
                )))
            }
            other => other,
        };

        debug!(%subject, provider_score, "bureau score received");

        Ok(ExternalScore {
            provider: Self::PROVIDER.to_string(),
            provider_score,
            provider_band: parsed.faixa,
            default_probability,
            raw_payload,
            queried_at: Utc::now(),
        })
    }
}
