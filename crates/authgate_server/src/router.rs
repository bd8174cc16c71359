//! Route table and handlers.

use crate::dto::{HealthResponse, LoginBody, LoginResponse, MessageResponse, RegisterBody};
use crate::error::ApiResult;
use crate::state::AppState;
use authgate_core::{LoginRequest, RegisterRequest};
use axum::extract::State;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Builds the application router.
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .layer(cors)
        .with_state(state)
}

/// Builds a CORS layer admitting exactly `origins`.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin.trim())
                .map_err(|err| anyhow::anyhow!("invalid CORS origin `{origin}`: {err}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]))
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: authgate_core::core_version().to_string(),
    })
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> ApiResult<Json<LoginResponse>> {
    let request = LoginRequest::from(body);
    let success = state.with_auth(move |auth| auth.login(&request)).await?;
    Ok(Json(LoginResponse::from(success)))
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let request = RegisterRequest::from(body);
    state.with_auth(move |auth| auth.register(&request)).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}
