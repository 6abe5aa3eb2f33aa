use std::sync::Arc;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use procedure_cell::router::procedure_routes;
use procedure_cell::services::ProcedureCatalogue;

fn create_test_app() -> Router {
    procedure_routes(Arc::new(ProcedureCatalogue::standard().unwrap()))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_list_procedures() {
    let (status, body) = get_json(create_test_app(), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 21);
    assert_eq!(body["procedures"][0]["procedure"]["id"], "lip-augmentation");
    assert_eq!(body["procedures"][0]["duration_label"], "30 min");
}

#[tokio::test]
async fn test_list_procedures_filtered_by_category() {
    let (status, body) = get_json(create_test_app(), "/?category=Corporal").await;

    assert_eq!(status, StatusCode::OK);
    let procedures = body["procedures"].as_array().unwrap();
    assert!(!procedures.is_empty());
    assert!(procedures.iter().all(|p| p["procedure"]["category"] == "Corporal"));
}

#[tokio::test]
async fn test_list_categories() {
    let (status, body) = get_json(create_test_app(), "/categories").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["categories"], serde_json::json!(["Facial", "Bariatría", "Corporal"]));
}

#[tokio::test]
async fn test_get_procedure_found_and_missing() {
    let (status, body) = get_json(create_test_app(), "/facelift").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["procedure"]["size"], "large");
    assert_eq!(body["duration_label"], "3h 30min");

    let (status, body) = get_json(create_test_app(), "/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("unknown"));
}
