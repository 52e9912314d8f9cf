//! External credit bureau collaborators.
//!
//! The engine only sees [`BureauGateway`]; which implementation backs it is decided once
//! at start-up from [`BureauConfig`].

mod http;
mod mock;

pub use http::HttpBureau;
pub use mock::MockBureau;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::ExternalScore;
use crate::config::{BureauConfig, BureauMode};

const CNPJ_DIGITS: usize = 14;
const CPF_DIGITS: usize = 11;

/// Who the bureau is asked about, keyed by Brazilian taxpayer document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "document", rename_all = "snake_case")]
pub enum BureauSubject {
    Company(String),
    Person(String),
}

impl BureauSubject {
    /// Accepts a CNPJ with or without `.`/`/`/`-` punctuation.
    pub fn company(cnpj: &str) -> Result<Self, BureauError> {
        digits_only("cnpj", cnpj, CNPJ_DIGITS).map(Self::Company)
    }

    /// Accepts a CPF with or without `.`/`-` punctuation.
    pub fn person(cpf: &str) -> Result<Self, BureauError> {
        digits_only("cpf", cpf, CPF_DIGITS).map(Self::Person)
    }

    pub fn document(&self) -> &str {
        match self {
            BureauSubject::Company(document) | BureauSubject::Person(document) => document,
        }
    }

    /// Name of the document field on the bureau wire format.
    pub fn document_field(&self) -> &'static str {
        match self {
            BureauSubject::Company(_) => "cnpj",
            BureauSubject::Person(_) => "cpf",
        }
    }
}

impl fmt::Display for BureauSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.document_field(), self.document())
    }
}

fn digits_only(field: &'static str, raw: &str, expected: usize) -> Result<String, BureauError> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '.' | '/' | '-'))
        .collect();

    if cleaned.len() == expected && cleaned.chars().all(|ch| ch.is_ascii_digit()) {
        Ok(cleaned)
    } else {
        Err(BureauError::InvalidIdentifier {
            field,
            expected,
            found: raw.to_string(),
        })
    }
}

/// Failure modes of a bureau lookup. None of them are fatal to an assessment.
#[derive(Debug, thiserror::Error)]
pub enum BureauError {
    #[error("{field} must contain exactly {expected} digits (found '{found}')")]
    InvalidIdentifier {
        field: &'static str,
        expected: usize,
        found: String,
    },
    #[error("bureau did not answer within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
    #[error("bureau transport failure: {0}")]
    Transport(String),
    #[error("bureau responded with status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },
    #[error("bureau response could not be interpreted: {0}")]
    InvalidResponse(String),
    #[error("bureau client could not be built: {0}")]
    Client(String),
}

impl BureauError {
    /// Errors caused by the caller rather than the bureau.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, BureauError::InvalidIdentifier { .. })
    }
}

/// Single capability the engine consumes from a bureau: one lookup, no retries.
#[async_trait]
pub trait BureauGateway: Send + Sync + fmt::Debug {
    fn provider(&self) -> &str;

    async fn fetch_external_score(
        &self,
        subject: &BureauSubject,
    ) -> Result<ExternalScore, BureauError>;
}

/// Build the bureau collaborator selected by configuration.
pub fn gateway_from_config(config: &BureauConfig) -> Result<Arc<dyn BureauGateway>, BureauError> {
    match config.mode {
        BureauMode::Mock => Ok(Arc::new(MockBureau::default())),
        BureauMode::Http => {
            let base_url = config
                .base_url
                .as_deref()
                .ok_or_else(|| BureauError::Client("missing bureau base url".to_string()))?;
            let client = HttpBureau::new(base_url, config.api_token.clone(), config.timeout_ms)?;
            Ok(Arc::new(client))
        }
    }
}
