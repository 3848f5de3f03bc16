//! REST endpoints over the wizard.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::error::InputError;

use super::manager::{RecommendOutcome, WizardManager};
use super::model::{Bank, CardCount, Merchant, ProfileField};

/// Shared state for wizard routes.
#[derive(Clone)]
pub struct WizardRouteState {
    pub manager: Arc<WizardManager>,
}

fn bad_input(err: InputError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": err.to_string()})),
    )
        .into_response()
}

async fn status_json(state: &WizardRouteState) -> Response {
    Json(state.manager.status().await).into_response()
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "project": "SwipeSense"}))
}

/// GET /api/wizard
async fn get_status(State(state): State<WizardRouteState>) -> Response {
    status_json(&state).await
}

#[derive(Deserialize)]
struct ProfileFieldRequest {
    field: String,
    value: String,
}

/// PUT /api/wizard/profile
async fn set_profile_field(
    State(state): State<WizardRouteState>,
    Json(body): Json<ProfileFieldRequest>,
) -> Response {
    let field = match body.field.parse::<ProfileField>() {
        Ok(field) => field,
        Err(e) => return bad_input(e),
    };
    state.manager.set_profile_field(field, body.value).await;
    status_json(&state).await
}

/// POST /api/wizard/auth
///
/// 422 with the validation message when the profile is incomplete.
async fn submit_auth(State(state): State<WizardRouteState>) -> Response {
    match state.manager.submit_auth().await {
        Ok(()) => status_json(&state).await,
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": e.to_string(),
                "status": state.manager.status().await,
            })),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
struct CardCountRequest {
    count: i64,
}

/// PUT /api/wizard/card-count
async fn set_card_count(
    State(state): State<WizardRouteState>,
    Json(body): Json<CardCountRequest>,
) -> Response {
    let count = match CardCount::try_from(body.count) {
        Ok(count) => count,
        Err(e) => return bad_input(e),
    };
    state.manager.set_card_count(count).await;
    status_json(&state).await
}

/// POST /api/wizard/banks/{bank}
///
/// Toggles the bank. `changed` is false when the selection was already full.
async fn toggle_bank(
    State(state): State<WizardRouteState>,
    Path(bank): Path<String>,
) -> Response {
    let bank = match bank.parse::<Bank>() {
        Ok(bank) => bank,
        Err(e) => return bad_input(e),
    };
    let changed = state.manager.toggle_bank(bank).await;
    Json(serde_json::json!({
        "changed": changed,
        "status": state.manager.status().await,
    }))
    .into_response()
}

#[derive(Deserialize)]
struct MerchantRequest {
    merchant: String,
}

/// PUT /api/wizard/merchant
async fn set_merchant(
    State(state): State<WizardRouteState>,
    Json(body): Json<MerchantRequest>,
) -> Response {
    let merchant = match body.merchant.parse::<Merchant>() {
        Ok(merchant) => merchant,
        Err(e) => return bad_input(e),
    };
    state.manager.set_merchant(merchant).await;
    status_json(&state).await
}

/// POST /api/wizard/reset
async fn reset(State(state): State<WizardRouteState>) -> Response {
    state.manager.reset().await;
    status_json(&state).await
}

/// POST /api/wizard/health
///
/// Probes the recommendation backend and returns the refreshed status.
async fn probe_backend(State(state): State<WizardRouteState>) -> Response {
    state.manager.probe_health().await;
    status_json(&state).await
}

/// POST /api/wizard/recommend
async fn recommend(State(state): State<WizardRouteState>) -> Response {
    match state.manager.get_recommendation().await {
        RecommendOutcome::Ready(_) => status_json(&state).await,
        RecommendOutcome::Blocked(reason) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({
                "error": reason.to_string(),
                "reason": reason,
            })),
        )
            .into_response(),
        RecommendOutcome::Failed(e) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({
                "error": e.user_message(),
                "status": state.manager.status().await,
            })),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
struct TransactionRequest {
    category: String,
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
}

/// POST /api/transactions/advice
async fn transaction_advice(
    State(state): State<WizardRouteState>,
    Json(body): Json<TransactionRequest>,
) -> Response {
    match state
        .manager
        .check_transaction(body.category, body.amount)
        .await
    {
        Ok(advice) => Json(advice).into_response(),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({"error": e.user_message()})),
        )
            .into_response(),
    }
}

/// Build the wizard REST routes.
pub fn wizard_routes(state: WizardRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/wizard", get(get_status))
        .route("/api/wizard/profile", put(set_profile_field))
        .route("/api/wizard/auth", post(submit_auth))
        .route("/api/wizard/card-count", put(set_card_count))
        .route("/api/wizard/banks/{bank}", post(toggle_bank))
        .route("/api/wizard/merchant", put(set_merchant))
        .route("/api/wizard/reset", post(reset))
        .route("/api/wizard/health", post(probe_backend))
        .route("/api/wizard/recommend", post(recommend))
        .route("/api/transactions/advice", post(transaction_advice))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
