use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use ml::dataset::{generate_schedule_records, DatasetConfig};
use ml::forest::ForestConfig;
use ml::training::{train_wait_time_model, TrainingConfig};
use rest_api::{app_router, AppState, API_VERSION};

fn loaded_app() -> Router {
    let records = generate_schedule_records(&DatasetConfig {
        num_records: 500,
        seed: 7,
        noise_std_dev: 5.0,
    })
    .expect("generator weights are valid");
    let config = TrainingConfig {
        forest: ForestConfig {
            n_estimators: 12,
            max_depth: 8,
            ..ForestConfig::default()
        },
        test_fraction: 0.2,
        seed: 7,
    };
    let model =
        train_wait_time_model(&records, &config).expect("training on synthetic data succeeds");
    app_router(AppState::with_model(model))
}

fn degraded_app() -> Router {
    app_router(AppState::without_model())
}

fn patient_payload() -> Value {
    json!({
        "arrival_hour": 14,
        "day_of_week": "Monday",
        "department": "Emergency",
        "priority": "High",
        "num_available_doctors": 5,
        "num_available_nurses": 8,
        "num_available_rooms": 10,
        "current_queue_length": 15,
        "patient_age": 45,
        "is_weekend": 0,
        "season": "Winter"
    })
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_json(app: Router, uri: &str, payload: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn root_lists_endpoints() {
    let (status, body) = get_json(degraded_app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], API_VERSION);
    assert_eq!(body["endpoints"]["predict"], "/predict");
    assert_eq!(body["endpoints"]["health"], "/health");
}

#[tokio::test]
async fn healthz_alias_serves_the_health_body() {
    let app = loaded_app();
    let (status, health) = get_json(app.clone(), "/health").await;
    let (alias_status, healthz) = get_json(app, "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(alias_status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["model_loaded"], true);
    assert_eq!(health["api_version"], API_VERSION);
    assert_eq!(healthz, health);
}

#[tokio::test]
async fn health_answers_200_without_a_model() {
    let (status, body) = get_json(degraded_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model_loaded"], false);
}

#[tokio::test]
async fn predict_answers_with_prediction_and_echo() {
    let (status, body) = post_json(loaded_app(), "/predict", &patient_payload()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body["predicted_wait_time_minutes"].as_f64().unwrap() > 0.0);
    assert_eq!(body["input_data"], patient_payload());
}

#[tokio::test]
async fn predict_out_of_range_hour_gets_a_422_envelope() {
    let mut payload = patient_payload();
    payload["arrival_hour"] = json!(25);
    let (status, body) = post_json(loaded_app(), "/predict", &payload).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "validation failed");
    let errors = body["errors"].as_array().unwrap();
    assert!(errors[0].as_str().unwrap().contains("arrival_hour"));
}

#[tokio::test]
async fn predict_unknown_department_gets_a_422_envelope() {
    let mut payload = patient_payload();
    payload["department"] = json!("Oncology");
    let (status, body) = post_json(loaded_app(), "/predict", &payload).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("Oncology"));
}

#[tokio::test]
async fn predict_without_model_gets_a_503_envelope() {
    let (status, body) = post_json(degraded_app(), "/predict", &patient_payload()).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("not loaded"));
}

#[tokio::test]
async fn syntactically_broken_body_is_rejected_with_400() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ this is not json"))
        .unwrap();
    let response = degraded_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn incomplete_payload_is_rejected_with_422() {
    // Parses as JSON but misses most fields, so deserialization fails
    // before the handler runs.
    let payload = json!({
        "arrival_hour": 25,
        "day_of_week": "Monday",
        "department": "Emergency"
    });
    let request = Request::builder()
        .method(Method::POST)
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = degraded_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn batch_answers_every_item_in_order() {
    let mut unknown_department = patient_payload();
    unknown_department["department"] = json!("Oncology");
    let batch = json!([
        patient_payload(),
        unknown_department,
        { "arrival_hour": "noon" }
    ]);
    let (status, body) = post_json(loaded_app(), "/predict/batch", &batch).await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["status"], "success");
    assert_eq!(entries[0]["input_data"], patient_payload());
    assert_eq!(entries[1]["status"], "error");
    assert!(entries[1]["message"].as_str().unwrap().contains("Oncology"));
    assert_eq!(entries[2]["status"], "error");
}

#[tokio::test]
async fn departments_serves_the_trained_categories() {
    let (status, body) = get_json(loaded_app(), "/departments").await;
    assert_eq!(status, StatusCode::OK);
    let departments = body["departments"].as_array().unwrap();
    assert!(!departments.is_empty());
    assert!(departments.contains(&json!("Emergency")));
}

#[tokio::test]
async fn priorities_serves_the_trained_categories() {
    let (status, body) = get_json(loaded_app(), "/priorities").await;
    assert_eq!(status, StatusCode::OK);
    let priorities = body["priorities"].as_array().unwrap();
    assert!(!priorities.is_empty());
    assert!(priorities.contains(&json!("Critical")));
}

#[tokio::test]
async fn model_info_serves_the_persisted_metrics() {
    let (status, body) = get_json(loaded_app(), "/model/info").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_type"], "RandomForestRegressor");
    assert_eq!(body["status"], "loaded");
    assert_eq!(body["features"].as_array().unwrap().len(), 11);
    assert!(body["metrics"]["wait_time"]["test_r2"].is_number());
}

#[tokio::test]
async fn metadata_endpoints_are_503_without_model() {
    let app = degraded_app();
    for uri in ["/model/info", "/departments", "/priorities"] {
        let (status, body) = get_json(app.clone(), uri).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert_eq!(body["status"], "error", "{uri}");
    }
}
