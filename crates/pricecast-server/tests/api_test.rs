//! HTTP API tests driven through the router with `oneshot`.

use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use pricecast_core::{Category, CoefficientSet, History, LatestData, PredictionReport};
use pricecast_server::compile::COMPILED_FILE;
use pricecast_server::{AppState, CsvHistorySource, StaticHistory, router};
use serde_json::{Value, json};
use tower::ServiceExt;

fn history() -> History {
    History::new()
        .with_series(Category::Labor, vec![1.0, 2.0, 3.0, 4.0])
        .with_series(Category::Capital, vec![0.5, 0.5, 0.5, 0.5])
        .with_series(Category::Materials, vec![2.0, 1.0, 0.0, -1.0])
        .with_series(Category::Energy, vec![3.0, 3.0, 3.0, 3.0])
        .with_series(Category::Other, vec![0.0; 4])
}

fn app() -> Router {
    router(AppState::new(StaticHistory(history())), true)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(), get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "message": "API is running"}));
}

#[tokio::test]
async fn test_index_lists_endpoints() {
    let (status, body) = send(app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["endpoints"]["predict"], "/api/predict");
}

#[tokio::test]
async fn test_latest_data() {
    let (status, body) = send(app(), get("/api/data/latest")).await;
    assert_eq!(status, StatusCode::OK);
    let data: LatestData = serde_json::from_value(body).unwrap();
    assert_eq!(data.labor, 4.0);
    assert_eq!(data.materials, -1.0);
    assert_eq!(data.full_data.unwrap()[&Category::Energy], vec![3.0; 4]);
}

#[tokio::test]
async fn test_latest_data_missing_file_is_server_error() {
    let app = router(AppState::new(CsvHistorySource::new("/nonexistent/compiled.csv")), true);
    let (status, body) = send(app, get("/api/data/latest")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("Data file not found"));
}

#[tokio::test]
async fn test_latest_data_compiled_from_raw_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("energy_data_last5months.csv"),
        "date,value\n2024-01-01,50\n2024-02-01,100\n2024-03-01,125\n",
    )
    .unwrap();
    let source = CsvHistorySource::new(dir.path().join(COMPILED_FILE));
    assert!(source.ensure_compiled().unwrap());

    let app = router(AppState::new(source), true);
    let (status, body) = send(app, get("/api/data/latest")).await;
    assert_eq!(status, StatusCode::OK);
    let data: LatestData = serde_json::from_value(body).unwrap();
    assert!((data.energy - 25.0).abs() < 1e-9);
    assert_eq!(data.labor, 4.0);
}

#[tokio::test]
async fn test_default_coefficients() {
    let (status, body) = send(app(), get("/api/coefficients/default")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["labor_t"], json!(0.14));
    assert_eq!(body["capital_t3"], json!(-0.11));
    let set: CoefficientSet = serde_json::from_value(body).unwrap();
    assert_eq!(set, CoefficientSet::model_defaults());
}

#[tokio::test]
async fn test_predict_with_explicit_series() {
    let body = json!({
        "labor": [1, 2, 3, 4],
        "capital": [0.5, 0.5, 0.5, 0.5],
        "materials": [2, 1, 0, -1],
        "energy": [3, 3, 3, 3],
        "other": [0, 0, 0, 0],
    });
    let (status, value) = send(app(), post_json("/api/predict", &body)).await;
    assert_eq!(status, StatusCode::OK);
    let report: PredictionReport = serde_json::from_value(value).unwrap();
    assert!((report.terms.term1 - 0.645).abs() < 1e-9);
    assert!((report.terms.term4 - 0.325).abs() < 1e-9);
    assert!(report.result.is_consistent());
    assert_eq!(report.delta_p, report.result.mean);
}

#[tokio::test]
async fn test_predict_with_shares_and_coefficients() {
    let body = json!({
        "labor": 20, "capital": 20, "materials": 20, "energy": 20, "other": 20,
        "coefficients": CoefficientSet::dashboard_defaults(),
    });
    let (status, value) = send(app(), post_json("/api/predict", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["inputs"]["labor"]["t"], json!(0.8));
    assert_eq!(value["convention"], json!("signed"));
    assert!(value["stdDev"].as_f64().unwrap() >= 0.5);
}

#[tokio::test]
async fn test_predict_empty_body_uses_history() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/predict")
        .body(Body::empty())
        .unwrap();
    let (status, value) = send(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["inputs"]["energy"]["t-2"], json!(3.0));
}

#[tokio::test]
async fn test_predict_rejects_unbalanced_shares() {
    let body = json!({"labor": 50, "capital": 20, "materials": 20, "energy": 20, "other": 20});
    let (status, value) = send(app(), post_json("/api/predict", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"], "Allocations must sum to 100% (currently 130.00%)");
}

#[tokio::test]
async fn test_predict_rejects_malformed_json() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/predict")
        .body(Body::from("{\"labor\": "))
        .unwrap();
    let (status, value) = send(app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["error"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_predict_rejects_incomplete_coefficients() {
    let body = json!({"coefficients": {"labor_t": 0.1}});
    let (status, value) = send(app(), post_json("/api/predict", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(value["error"].is_string());
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let response = app().oneshot(get("/api/health")).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_cors_preflight() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/predict")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert!(response.headers().contains_key("access-control-allow-origin"));
}
