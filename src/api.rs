//! REST API for the card registry.
//!
//! # Routes
//!
//! | Method | Path | Result |
//! |--------|------|--------|
//! | GET | `/api/cards` | every stored card |
//! | GET | `/api/cards/{id}` | one card, or 404 |
//! | POST | `/api/cards` | 201 with the stored card, or 400 with every field error |
//! | PUT | `/api/cards/{id}` | 200 with the updated card, 400 or 404 |
//! | DELETE | `/api/cards/{id}` | 204, or 404 |
//! | POST | `/api/format` | input masks applied to each supplied field |
//! | POST | `/api/validate` | dry-run validation, nothing stored |
//! | GET | `/health` | liveness |
//!
//! Single errors are returned as `{"error": "..."}`; validation failures as
//! `{"errors": [{"field", "kind", "message"}, ...]}`.
//!
//! # Swagger UI
//!
//! Served at `/swagger-ui/`, with the OpenAPI document at
//! `/api-docs/openapi.json`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::error::{ErrorKind, Field, ValidationError};
use crate::format::{format_card_number, format_cpf, format_date};
use crate::record::{CardRecord, CardUpdate, NewCard};
use crate::registry::{CardRegistry, RegistryError};

// ============================================================================
// OpenAPI Documentation
// ============================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Card Registry API",
        description = "Personal credit card registry. Card numbers are checked with Luhn, CPFs with their two check digits, and holders must be between 18 and 120 years old. No auth or rate limiting.",
        license(name = "MIT")
    ),
    tags(
        (name = "Cards", description = "Stored card records"),
        (name = "Utilities", description = "Input masks and dry-run validation"),
        (name = "System", description = "Health and status endpoints")
    ),
    paths(
        list_cards,
        get_card,
        create_card,
        update_card,
        delete_card,
        format_fields,
        validate_fields,
        health,
    ),
    components(schemas(
        CardResponse,
        NewCard,
        CardUpdate,
        FieldError,
        Field,
        ErrorKind,
        ErrorBody,
        ValidationErrorsBody,
        FormatRequest,
        FormatResponse,
        ValidateResponse,
        HealthResponse,
    ))
)]
pub struct ApiDoc;

// ============================================================================
// Request/Response Types
// ============================================================================

/// A stored card as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": "0b7f6f0e-3c1e-4d43-9a55-0f3b8a3f1c2d",
    "holderName": "Maria Silva",
    "cardNumber": "4532015112830366",
    "birthDate": "25/05/2004",
    "cpf": "11144477735",
    "createdAt": "2024-06-15T12:00:00Z"
}))]
pub struct CardResponse {
    /// Record identifier
    pub id: String,
    /// Trimmed holder name
    pub holder_name: String,
    /// Card number, digits only
    pub card_number: String,
    /// Birth date as DD/MM/YYYY
    pub birth_date: String,
    /// CPF, digits only
    pub cpf: String,
    /// Creation time (RFC 3339, UTC)
    pub created_at: DateTime<Utc>,
}

impl From<&CardRecord> for CardResponse {
    fn from(record: &CardRecord) -> Self {
        Self {
            id: record.id().to_string(),
            holder_name: record.holder_name().to_string(),
            card_number: record.card_number().to_string(),
            birth_date: record.birth_date().to_string(),
            cpf: record.cpf().to_string(),
            created_at: record.created_at(),
        }
    }
}

/// One failed validation rule.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    /// Field that failed
    pub field: Field,
    /// Failure category
    pub kind: ErrorKind,
    /// Human-readable explanation
    pub message: String,
}

impl From<&ValidationError> for FieldError {
    fn from(e: &ValidationError) -> Self {
        Self {
            field: e.field(),
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// Single error message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// What went wrong
    pub error: String,
}

/// Every validation failure of a rejected submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorsBody {
    /// Failures in field order
    pub errors: Vec<FieldError>,
}

/// Raw field values to mask. Absent fields are left out of the response.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[schema(example = json!({"cardNumber": "4532015112830366", "cpf": "11144477735", "birthDate": "25052004"}))]
pub struct FormatRequest {
    /// Card number as typed
    pub card_number: Option<String>,
    /// CPF as typed
    pub cpf: Option<String>,
    /// Birth date as typed
    pub birth_date: Option<String>,
}

/// Masked field values.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormatResponse {
    /// Card number grouped in fours
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    /// CPF as XXX.XXX.XXX-XX
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    /// Date as DD/MM/YYYY
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

/// Dry-run validation result.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateResponse {
    /// Whether the submission would be accepted
    pub valid: bool,
    /// Every failed rule, empty when valid
    pub errors: Vec<FieldError>,
}

/// Liveness report.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Human-readable status line
    pub message: String,
    /// API version
    pub version: String,
    /// Server time (RFC 3339)
    pub timestamp: String,
}

// ============================================================================
// Errors
// ============================================================================

/// Errors surfaced by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A registry operation failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The request body could not be read as JSON.
    #[error("invalid request body: {0}")]
    BadRequest(String),

    /// A blocking task panicked or was cancelled.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Registry(RegistryError::Invalid(errors)) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorsBody {
                    errors: errors.iter().map(FieldError::from).collect(),
                }),
            )
                .into_response(),
            Self::Registry(RegistryError::NotFound(_)) => {
                error_response(StatusCode::NOT_FOUND, "card not found")
            }
            Self::Registry(RegistryError::Store(e)) => {
                tracing::error!(error = %e, "card store failure");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
            Self::BadRequest(message) => error_response(StatusCode::BAD_REQUEST, &message),
            Self::Internal(message) => {
                tracing::error!(%message, "handler failure");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Runs a registry call on the blocking pool; the file store does
/// synchronous I/O.
async fn run<T, F>(registry: CardRegistry, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&CardRegistry) -> Result<T, RegistryError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&registry))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

// ============================================================================
// Handlers
// ============================================================================

/// List every stored card
#[utoipa::path(
    get,
    path = "/api/cards",
    responses(
        (status = 200, description = "All cards", body = [CardResponse]),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    tag = "Cards"
)]
async fn list_cards(State(registry): State<CardRegistry>) -> Result<Json<Vec<CardResponse>>, ApiError> {
    let records = run(registry, |r| r.list()).await?;
    Ok(Json(records.iter().map(CardResponse::from).collect()))
}

/// Fetch one card
#[utoipa::path(
    get,
    path = "/api/cards/{id}",
    params(("id" = String, Path, description = "Card id")),
    responses(
        (status = 200, description = "The card", body = CardResponse),
        (status = 404, description = "No card with this id", body = ErrorBody)
    ),
    tag = "Cards"
)]
async fn get_card(
    State(registry): State<CardRegistry>,
    Path(id): Path<String>,
) -> Result<Json<CardResponse>, ApiError> {
    let record = run(registry, move |r| r.get(&id)).await?;
    Ok(Json(CardResponse::from(&record)))
}

/// Validate and store a new card
#[utoipa::path(
    post,
    path = "/api/cards",
    request_body = NewCard,
    responses(
        (status = 201, description = "Card stored", body = CardResponse),
        (status = 400, description = "Validation failed", body = ValidationErrorsBody)
    ),
    tag = "Cards"
)]
async fn create_card(
    State(registry): State<CardRegistry>,
    payload: Result<Json<NewCard>, JsonRejection>,
) -> Result<(StatusCode, Json<CardResponse>), ApiError> {
    let Json(card) = payload?;
    let record = run(registry, move |r| r.create(&card)).await?;
    Ok((StatusCode::CREATED, Json(CardResponse::from(&record))))
}

/// Update some fields of a card
///
/// Only the supplied fields are validated and changed.
#[utoipa::path(
    put,
    path = "/api/cards/{id}",
    params(("id" = String, Path, description = "Card id")),
    request_body = CardUpdate,
    responses(
        (status = 200, description = "Updated card", body = CardResponse),
        (status = 400, description = "Validation failed", body = ValidationErrorsBody),
        (status = 404, description = "No card with this id", body = ErrorBody)
    ),
    tag = "Cards"
)]
async fn update_card(
    State(registry): State<CardRegistry>,
    Path(id): Path<String>,
    payload: Result<Json<CardUpdate>, JsonRejection>,
) -> Result<Json<CardResponse>, ApiError> {
    let Json(update) = payload?;
    let record = run(registry, move |r| r.update(&id, &update)).await?;
    Ok(Json(CardResponse::from(&record)))
}

/// Delete a card
#[utoipa::path(
    delete,
    path = "/api/cards/{id}",
    params(("id" = String, Path, description = "Card id")),
    responses(
        (status = 204, description = "Card deleted"),
        (status = 404, description = "No card with this id", body = ErrorBody)
    ),
    tag = "Cards"
)]
async fn delete_card(
    State(registry): State<CardRegistry>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    run(registry, move |r| r.delete(&id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply input masks
#[utoipa::path(
    post,
    path = "/api/format",
    request_body = FormatRequest,
    responses(
        (status = 200, description = "Masked values", body = FormatResponse)
    ),
    tag = "Utilities"
)]
async fn format_fields(
    payload: Result<Json<FormatRequest>, JsonRejection>,
) -> Result<Json<FormatResponse>, ApiError> {
    let Json(req) = payload?;
    Ok(Json(FormatResponse {
        card_number: req.card_number.as_deref().map(format_card_number),
        cpf: req.cpf.as_deref().map(format_cpf),
        birth_date: req.birth_date.as_deref().map(format_date),
    }))
}

/// Validate a submission without storing it
#[utoipa::path(
    post,
    path = "/api/validate",
    request_body = NewCard,
    responses(
        (status = 200, description = "Validation result", body = ValidateResponse)
    ),
    tag = "Utilities"
)]
async fn validate_fields(
    State(registry): State<CardRegistry>,
    payload: Result<Json<NewCard>, JsonRejection>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let Json(card) = payload?;
    let errors = registry.check(&card);
    Ok(Json(ValidateResponse {
        valid: errors.is_empty(),
        errors: errors.iter().map(FieldError::from).collect(),
    }))
}

/// Health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "System"
)]
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "card registry API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

async fn route_not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "route not found")
}

// ============================================================================
// Router
// ============================================================================

/// Builds the API routes and Swagger UI, without CORS or tracing layers.
pub fn router(registry: CardRegistry) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/cards", get(list_cards).post(create_card))
        .route(
            "/api/cards/:id",
            get(get_card).put(update_card).delete(delete_card),
        )
        .route("/api/format", post(format_fields))
        .route("/api/validate", post(validate_fields))
        .route("/health", get(health))
        .fallback(route_not_found)
        .with_state(registry)
}

/// Builds the full application: routes plus CORS and request tracing.
pub fn app(registry: CardRegistry, allowed_origins: &[String]) -> Router {
    router(registry)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS policy for the given origins; an empty list allows any origin.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}
