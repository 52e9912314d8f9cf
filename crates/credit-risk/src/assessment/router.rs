use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::bureau::{BureauError, BureauSubject};
use super::domain::{FinancialProfile, PricingRequest};
use super::engine::EngineError;
use super::service::{
    AssessmentService, AssessmentServiceError, ComparisonRequest, FullAssessmentRequest,
};

#[derive(Debug, Deserialize)]
pub(crate) struct CompanyQuery {
    cnpj: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PersonQuery {
    cpf: String,
}

/// Router builder exposing scoring, pricing, and bureau endpoints.
pub fn assessment_router(service: Arc<AssessmentService>) -> Router {
    Router::new()
        .route("/api/v1/risk-score", post(risk_score_handler))
        .route("/api/v1/interest-rate", post(interest_rate_handler))
        .route("/api/v1/full-score", post(full_score_handler))
        .route("/api/v1/bureau/company-score", post(company_score_handler))
        .route("/api/v1/bureau/person-score", post(person_score_handler))
        .route("/api/v1/reconcile", post(reconcile_handler))
        .with_state(service)
}

pub(crate) async fn risk_score_handler(
    State(service): State<Arc<AssessmentService>>,
    payload: Result<axum::Json<FinancialProfile>, JsonRejection>,
) -> Response {
    let axum::Json(profile) = match payload {
        Ok(json) => json,
        Err(rejection) => return json_rejection_response(rejection),
    };
    match service.assess(&profile) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment)).into_response(),
        Err(error) => engine_error_response(error),
    }
}

pub(crate) async fn interest_rate_handler(
    State(service): State<Arc<AssessmentService>>,
    payload: Result<axum::Json<PricingRequest>, JsonRejection>,
) -> Response {
    let axum::Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return json_rejection_response(rejection),
    };
    match service.quote(&request) {
        Ok(rate) => (StatusCode::OK, axum::Json(rate)).into_response(),
        Err(error) => engine_error_response(error),
    }
}

pub(crate) async fn full_score_handler(
    State(service): State<Arc<AssessmentService>>,
    payload: Result<axum::Json<FullAssessmentRequest>, JsonRejection>,
) -> Response {
    let axum::Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return json_rejection_response(rejection),
    };
    match service.full_assessment(&request) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment)).into_response(),
        Err(error) => engine_error_response(error),
    }
}

pub(crate) async fn company_score_handler(
    State(service): State<Arc<AssessmentService>>,
    Query(query): Query<CompanyQuery>,
) -> Response {
    match BureauSubject::company(&query.cnpj) {
        Ok(subject) => lookup_response(&service, subject).await,
        Err(error) => bureau_error_response(error),
    }
}

pub(crate) async fn person_score_handler(
    State(service): State<Arc<AssessmentService>>,
    Query(query): Query<PersonQuery>,
) -> Response {
    match BureauSubject::person(&query.cpf) {
        Ok(subject) => lookup_response(&service, subject).await,
        Err(error) => bureau_error_response(error),
    }
}

pub(crate) async fn reconcile_handler(
    State(service): State<Arc<AssessmentService>>,
    payload: Result<axum::Json<ComparisonRequest>, JsonRejection>,
) -> Response {
    let axum::Json(request) = match payload {
        Ok(json) => json,
        Err(rejection) => return json_rejection_response(rejection),
    };
    match service.compare(&request).await {
        Ok(comparison) => (StatusCode::OK, axum::Json(comparison)).into_response(),
        Err(AssessmentServiceError::Engine(error)) => engine_error_response(error),
        Err(AssessmentServiceError::Bureau(error)) => bureau_error_response(error),
    }
}

async fn lookup_response(service: &AssessmentService, subject: BureauSubject) -> Response {
    match service.lookup(&subject).await {
        Ok(score) => (StatusCode::OK, axum::Json(score)).into_response(),
        Err(error) => bureau_error_response(error),
    }
}

fn engine_error_response(error: EngineError) -> Response {
    let (status, payload) = match &error {
        EngineError::InvalidInput(invalid) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "error": error.to_string(),
                "field": invalid.field,
            }),
        ),
        EngineError::RejectedApplication { score } => (
            StatusCode::CONFLICT,
            json!({
                "error": error.to_string(),
                "decision": "rejected",
                "score": score,
            }),
        ),
    };
    (status, axum::Json(payload)).into_response()
}

/// Body errors use the same `{error, field}` shape as engine validation failures.
fn json_rejection_response(rejection: JsonRejection) -> Response {
    let message = rejection.body_text();
    let payload = json!({
        "error": message,
        "field": rejected_field(&message),
    });
    (rejection.status(), axum::Json(payload)).into_response()
}

/// Field named by a serde failure: "missing field `x`" or a "path: reason" prefix.
fn rejected_field(message: &str) -> Option<String> {
    let detail = message
        .split_once("target type: ")
        .map_or(message, |(_, detail)| detail);

    if let Some(rest) = detail.strip_prefix("missing field `") {
        return rest.split_once('`').map(|(field, _)| field.to_string());
    }

    let (path, _) = detail.split_once(": ")?;
    let is_path = !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    is_path.then(|| path.to_string())
}

fn bureau_error_response(error: BureauError) -> Response {
    let status = if error.is_caller_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::BAD_GATEWAY
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
