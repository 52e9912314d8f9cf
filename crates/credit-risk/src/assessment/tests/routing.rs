use super::common::*;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

fn json_request(uri: &str, payload: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

fn empty_post(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn risk_score_route_returns_breakdown() {
    let router = router_with_service(build_service());
    let payload = serde_json::to_value(golden_profile()).unwrap();

    let response = router
        .oneshot(json_request("/api/v1/risk-score", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["band"], "A");
    assert_eq!(body["contributions"].as_array().map(Vec::len), Some(8));
}

#[tokio::test]
async fn risk_score_route_names_invalid_field() {
    let router = router_with_service(build_service());
    let mut profile = golden_profile();
    profile.average_daily_balance = -10.0;
    let payload = serde_json::to_value(profile).unwrap();

    let response = router
        .oneshot(json_request("/api/v1/risk-score", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["field"], "average_daily_balance");
}

#[tokio::test]
async fn risk_score_route_names_field_that_fails_to_deserialize() {
    let router = router_with_service(build_service());
    let mut payload = serde_json::to_value(golden_profile()).unwrap();
    payload["personal_credit_score"] = json!(-5);

    let response = router
        .oneshot(json_request("/api/v1/risk-score", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["field"], "personal_credit_score");
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn interest_rate_route_names_missing_field() {
    let router = router_with_service(build_service());

    let response = router
        .oneshot(json_request(
            "/api/v1/interest-rate",
            &json!({ "final_risk_score": 700.0, "term_months": 12 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["field"], "requested_amount");
}

#[tokio::test]
async fn interest_rate_route_keeps_invalid_input_apart_from_rejection() {
    let router = router_with_service(build_service());

    let response = router
        .oneshot(json_request(
            "/api/v1/interest-rate",
            &json!({
                "final_risk_score": 700.0,
                "term_months": 0,
                "requested_amount": 50000.0
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert_eq!(body["field"], "term_months");
    assert!(body.get("decision").is_none());
}

#[tokio::test]
async fn interest_rate_route_rejects_reproved_scores() {
    let router = router_with_service(build_service());

    let response = router
        .oneshot(json_request(
            "/api/v1/interest-rate",
            &json!({
                "final_risk_score": 150.0,
                "term_months": 12,
                "requested_amount": 50000.0
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json_body(response).await;
    assert_eq!(body["decision"], "rejected");
    assert_eq!(body["score"], 150.0);
}

#[tokio::test]
async fn full_score_route_reports_rejection_inline() {
    let router = router_with_service(build_service());
    let payload = serde_json::to_value(full_request(distressed_profile())).unwrap();

    let response = router
        .oneshot(json_request("/api/v1/full-score", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["band"], "automatically_reproved");
    assert_eq!(body["pricing"]["decision"], "rejected");
}

#[tokio::test]
async fn full_score_route_prices_golden_profile() {
    let router = router_with_service(build_service());
    let payload = serde_json::to_value(full_request(golden_profile())).unwrap();

    let response = router
        .oneshot(json_request("/api/v1/full-score", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["pricing"]["decision"], "priced");
    let rate = body["pricing"]["annual_rate"].as_f64().unwrap();
    assert!((rate - 0.145).abs() < 1e-9);
}

#[tokio::test]
async fn company_score_route_validates_cnpj() {
    let router = router_with_service(build_service());

    let response = router
        .oneshot(empty_post("/api/v1/bureau/company-score?cnpj=123"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn person_score_route_returns_catalogued_score() {
    let router = router_with_service(build_service());

    let response = router
        .oneshot(empty_post("/api/v1/bureau/person-score?cpf=12345678901"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["provider_score"], 820);
    assert_eq!(body["provider_band"], "A");
}

#[tokio::test]
async fn company_score_route_maps_outage_to_bad_gateway() {
    let router = router_with_service(offline_service());

    let response = router
        .oneshot(empty_post("/api/v1/bureau/company-score?cnpj=12345678000123"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn reconcile_route_survives_outage() {
    let router = router_with_service(offline_service());
    let mut payload = serde_json::to_value(golden_profile()).unwrap();
    payload["cnpj"] = json!("12345678000123");

    let response = router
        .oneshot(json_request("/api/v1/reconcile", &payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["bureau"]["status"], "unavailable");
    assert_eq!(body["reconciliation"]["external_unavailable"], true);
    assert_eq!(
        body["reconciliation"]["blended_score"],
        body["internal"]["score"]
    );
}
