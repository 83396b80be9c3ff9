//! HTTP tests for the REST API, driven through the router in-process.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use card_registry::api;
use card_registry::clock::FixedClock;
use card_registry::registry::CardRegistry;
use card_registry::store::{JsonFileStore, MemoryStore};
use chrono::NaiveDate;

fn clock() -> FixedClock {
    FixedClock(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
}

fn app() -> Router {
    api::router(CardRegistry::with_clock(MemoryStore::new(), clock()))
}

fn valid_body() -> Value {
    json!({
        "holderName": "Maria Silva",
        "cardNumber": "4532 0151 1283 0366",
        "birthDate": "25/05/2004",
        "cpf": "111.444.777-35"
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create(app: &Router) -> Value {
    let (status, body) = send(app, Method::POST, "/api/cards", Some(valid_body())).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body
}

// =============================================================================
// CARDS
// =============================================================================

#[tokio::test]
async fn test_create_card() {
    let app = app();
    let body = create(&app).await;

    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(body["holderName"], "Maria Silva");
    assert_eq!(body["cardNumber"], "4532015112830366");
    assert_eq!(body["birthDate"], "25/05/2004");
    assert_eq!(body["cpf"], "11144477735");
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn test_create_reports_every_error() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cards",
        Some(json!({
            "holderName": "Jo",
            "cardNumber": "1234567890123",
            "birthDate": "16/06/2006",
            "cpf": "11111111111"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_array().unwrap();
    let fields: Vec<&str> = errors.iter().map(|e| e["field"].as_str().unwrap()).collect();
    assert_eq!(fields, vec!["holderName", "cardNumber", "birthDate", "cpf"]);
    assert_eq!(errors[2]["kind"], "range");
    assert!(errors.iter().all(|e| e["message"].is_string()));

    let (_, list) = send(&app, Method::GET, "/api/cards", None).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_create_missing_fields() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/api/cards", Some(json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 4);
    assert!(errors.iter().all(|e| e["kind"] == "missing"));
}

#[tokio::test]
async fn test_create_malformed_json() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/cards")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_list_and_get() {
    let app = app();
    let created = create(&app).await;
    let id = created["id"].as_str().unwrap();

    let (status, list) = send(&app, Method::GET, "/api/cards", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([created.clone()]));

    let (status, card) = send(&app, Method::GET, &format!("/api/cards/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(card, created);
}

#[tokio::test]
async fn test_get_unknown_card() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/cards/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "card not found"}));
}

#[tokio::test]
async fn test_update_card() {
    let app = app();
    let created = create(&app).await;
    let uri = format!("/api/cards/{}", created["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"holderName": "Maria Souza", "cardNumber": "5555 5555 5555 4444"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["createdAt"], created["createdAt"]);
    assert_eq!(body["holderName"], "Maria Souza");
    assert_eq!(body["cardNumber"], "5555555555554444");
    assert_eq!(body["cpf"], created["cpf"]);
}

#[tokio::test]
async fn test_update_invalid_changes_nothing() {
    let app = app();
    let created = create(&app).await;
    let uri = format!("/api/cards/{}", created["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({"holderName": "Maria Souza", "cpf": "11144477736"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "cpf");
    assert_eq!(body["errors"][0]["kind"], "checksum");

    let (_, card) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(card, created);
}

#[tokio::test]
async fn test_update_unknown_card() {
    let app = app();

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/cards/nope",
        Some(json!({"holderName": "Maria Souza"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Invalid input is reported before the lookup
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/cards/nope",
        Some(json!({"holderName": "Jo"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_card() {
    let app = app();
    let created = create(&app).await;
    let uri = format!("/api/cards/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_json_file_backend() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cards.json");
    let app = api::router(CardRegistry::with_clock(
        JsonFileStore::open(&path).unwrap(),
        clock(),
    ));

    let created = create(&app).await;

    let raw = std::fs::read_to_string(&path).unwrap();
    let stored: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored[0]["id"], created["id"]);
    assert_eq!(stored[0]["cardNumber"], "4532015112830366");
}

// =============================================================================
// UTILITIES
// =============================================================================

#[tokio::test]
async fn test_format_endpoint() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/format",
        Some(json!({"cardNumber": "45320151", "cpf": "1114447", "birthDate": "250520"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"cardNumber": "4532 0151", "cpf": "111.444.7", "birthDate": "25/05/20"})
    );
}

#[tokio::test]
async fn test_format_endpoint_partial() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/api/format", Some(json!({"cpf": "11144477735"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"cpf": "111.444.777-35"}));
}

#[tokio::test]
async fn test_validate_endpoint() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/api/validate", Some(valid_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"valid": true, "errors": []}));

    let mut invalid = valid_body();
    invalid["birthDate"] = json!("31/02/2000");
    let (status, body) = send(&app, Method::POST, "/api/validate", Some(invalid)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
    assert_eq!(body["errors"][0]["field"], "birthDate");
    assert_eq!(body["errors"][0]["kind"], "format");

    // Nothing is stored by a dry run
    let (_, list) = send(&app, Method::GET, "/api/cards", None).await;
    assert_eq!(list, json!([]));
}

// =============================================================================
// SYSTEM
// =============================================================================

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_unknown_route() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/nothing", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "route not found"}));
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/cards"].is_object());
    assert!(body["paths"]["/api/cards/{id}"].is_object());
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = api::app(
        CardRegistry::with_clock(MemoryStore::new(), clock()),
        &["http://localhost:3000".to_string()],
    );

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/cards")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
}
