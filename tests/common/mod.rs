//! Shared fixtures: a stub recommendation backend and the wizard server.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use swipesense::config::RequestDefaults;
use swipesense::recommend::HttpRecommendationClient;
use swipesense::store::{MemoryStore, SnapshotStore};
use swipesense::wizard::{WizardManager, WizardRouteState, wizard_routes};

/// Maximum time any test is allowed to run before we consider it hung.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Address nothing listens on.
pub const DEAD_BACKEND: &str = "http://127.0.0.1:9";

/// How the stub answers `POST /recommend/card`.
#[derive(Debug, Clone, Copy)]
pub enum CardReply {
    Recommended,
    UseCard,
    ServerError,
    EmptyError,
    Malformed,
}

#[derive(Clone)]
struct BackendState {
    reply: CardReply,
    seen: Arc<Mutex<Vec<Value>>>,
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok", "project": "SwipeSense"}))
}

async fn recommend_card(State(state): State<BackendState>, Json(body): Json<Value>) -> Response {
    state.seen.lock().unwrap().push(body.clone());
    match state.reply {
        CardReply::Recommended => {
            let student = body["is_student"].as_bool().unwrap_or(false);
            if student && body["primary_spend"] == "groceries" {
                Json(json!({
                    "recommended_card": "No-Fee Cashback Card",
                    "reason": "Best for student grocery spending",
                }))
                .into_response()
            } else {
                Json(json!({
                    "recommended_card": "General Cashback Card",
                    "reason": "Balanced rewards for everyday spending",
                }))
                .into_response()
            }
        }
        CardReply::UseCard => Json(json!({
            "use_card": "Avion Points Card",
            "reason": "High-value purchase earns more points",
        }))
        .into_response(),
        CardReply::ServerError => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
        CardReply::EmptyError => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        CardReply::Malformed => Json(json!({"card": "?"})).into_response(),
    }
}

async fn recommend_transaction(Json(body): Json<Value>) -> Json<Value> {
    if body["amount"].as_f64().unwrap_or(0.0) > 500.0 {
        Json(json!({
            "use_card": "Avion Points Card",
            "reason": "High-value purchase earns more points",
        }))
    } else {
        Json(Value::Null)
    }
}

/// Serve `app` on a random local port and return its base URL.
pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{port}")
}

/// Start a stub backend; returns its base URL and the card requests it received.
pub async fn start_backend(reply: CardReply) -> (String, Arc<Mutex<Vec<Value>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/health", get(health))
        .route("/recommend/card", post(recommend_card))
        .route("/recommend/transaction", post(recommend_transaction))
        .with_state(BackendState {
            reply,
            seen: Arc::clone(&seen),
        });
    (serve(app).await, seen)
}

/// Start the wizard REST surface against `backend`, with an in-memory store.
pub async fn start_wizard(backend: &str) -> (String, Arc<WizardManager>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let client = HttpRecommendationClient::new(backend, Some(Duration::from_secs(2))).unwrap();
    let manager = Arc::new(
        WizardManager::load(
            Arc::clone(&store) as Arc<dyn SnapshotStore>,
            Arc::new(client),
            RequestDefaults::default(),
        )
        .await,
    );
    let app = wizard_routes(WizardRouteState {
        manager: Arc::clone(&manager),
    });
    (serve(app).await, manager, store)
}
