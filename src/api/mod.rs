// HTTP API
// axum routes wiring the detector, refiner, and checkout services.

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::{error, info};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::{
    CheckoutRequest, CheckoutResponse, DetectRequest, DetectionResult, RefineRequest,
    RefinementResult,
};
use crate::services::detector::{DetectError, Detector};
use crate::services::payments::{CheckoutClient, CheckoutError};
use crate::services::refiner::{RefineError, Refiner};

/// Dependencies are constructed once at startup and passed in explicitly;
/// handlers share them through this state, never through globals.
#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<Detector>,
    pub refiner: Arc<Refiner>,
    pub payments: Arc<CheckoutClient>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
}

pub fn router(state: AppState, config: &AppConfig) -> Router {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    // Credentialed CORS cannot use wildcards; mirroring grants all methods
    // and headers to the allow-listed origins only.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true);

    Router::new()
        .route("/", get(root))
        .route("/status", get(status))
        .route("/detect", post(detect_text))
        .route("/refine", post(refine_text))
        .route("/checkout", post(create_checkout))
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Refiner Shield backend is running" }))
}

async fn status() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "operational" }))
}

async fn detect_text(
    State(state): State<AppState>,
    Json(req): Json<DetectRequest>,
) -> Result<Json<DetectionResult>, (StatusCode, Json<ApiError>)> {
    let request_id = Uuid::new_v4();
    info!(%request_id, provider = %req.api_provider, text_len = req.text.len(), "detect");

    let result = state
        .detector
        .detect(&req.text, &req.api_provider)
        .await
        .map_err(|e| detect_error(&request_id, e))?;

    Ok(Json(result))
}

async fn refine_text(
    State(state): State<AppState>,
    Json(req): Json<RefineRequest>,
) -> Result<Json<RefinementResult>, (StatusCode, Json<ApiError>)> {
    let request_id = Uuid::new_v4();
    info!(
        %request_id,
        target_score = req.target_score,
        max_iterations = req.max_iterations,
        text_len = req.text.len(),
        "refine"
    );

    let result = state
        .refiner
        .refine(&req.text, req.target_score, req.max_iterations)
        .await
        .map_err(|e| refine_error(&request_id, e))?;

    Ok(Json(result))
}

async fn create_checkout(
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, (StatusCode, Json<ApiError>)> {
    let request_id = Uuid::new_v4();
    info!(%request_id, user_id = %req.user_id, "checkout");

    let checkout_url = state
        .payments
        .create_checkout_session(&req.user_id, &req.success_url, &req.cancel_url)
        .await
        .map_err(|e| checkout_error(&request_id, e))?;

    Ok(Json(CheckoutResponse { checkout_url }))
}

// ---------- error mapping ----------

fn detect_error(request_id: &Uuid, err: DetectError) -> (StatusCode, Json<ApiError>) {
    error!(%request_id, %err, "detection failed");
    reply(StatusCode::BAD_GATEWAY, err.to_string())
}

fn refine_error(request_id: &Uuid, err: RefineError) -> (StatusCode, Json<ApiError>) {
    error!(%request_id, %err, "refinement failed");
    let status = match &err {
        RefineError::InvalidIterationBudget | RefineError::InvalidTargetScore => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RefineError::CallTimeout(_) | RefineError::BudgetExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
        RefineError::Detection(_) | RefineError::Rewrite(_) => StatusCode::BAD_GATEWAY,
    };
    reply(status, err.to_string())
}

fn checkout_error(request_id: &Uuid, err: CheckoutError) -> (StatusCode, Json<ApiError>) {
    error!(%request_id, %err, "checkout failed");
    let status = match &err {
        CheckoutError::MissingSecretKey => StatusCode::INTERNAL_SERVER_ERROR,
        // The provider's rejection message passes through to the caller.
        CheckoutError::Provider { .. } => StatusCode::BAD_REQUEST,
        CheckoutError::Http(_) | CheckoutError::Json(_) | CheckoutError::MissingUrl => {
            StatusCode::BAD_GATEWAY
        }
    };
    reply(status, err.to_string())
}

fn reply(status: StatusCode, message: String) -> (StatusCode, Json<ApiError>) {
    (status, Json(ApiError { error: message }))
}
