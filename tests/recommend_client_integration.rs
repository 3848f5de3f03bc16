//! Integration tests for the HTTP recommendation client.
//!
//! Each test runs a stub backend on a random port and talks to it through
//! the real reqwest client.

mod common;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use rust_decimal_macros::dec;
use tokio::time::timeout;

use swipesense::error::{GENERIC_REQUEST_FAILURE, RequestError};
use swipesense::recommend::{
    HttpRecommendationClient, RecommendationClient, RecommendationRequest, ResponseShape,
    Transaction,
};

use common::{CardReply, DEAD_BACKEND, TEST_TIMEOUT, serve, start_backend};

fn client(base: &str) -> HttpRecommendationClient {
    HttpRecommendationClient::new(base, Some(Duration::from_secs(2))).unwrap()
}

fn request(spend: &str) -> RecommendationRequest {
    RecommendationRequest {
        is_student: true,
        primary_spend: spend.to_string(),
        priority: "cashback".to_string(),
    }
}

#[tokio::test]
async fn health_probe_reports_connected() {
    timeout(TEST_TIMEOUT, async {
        let (base, _seen) = start_backend(CardReply::Recommended).await;
        assert!(client(&base).probe_health().await.connected);
        assert!(!client(DEAD_BACKEND).probe_health().await.connected);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn failing_health_endpoint_reads_as_disconnected() {
    timeout(TEST_TIMEOUT, async {
        let app = Router::new().route(
            "/health",
            get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
        );
        let base = serve(app).await;
        assert!(!client(&base).probe_health().await.connected);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn recommended_card_shape_is_normalized() {
    timeout(TEST_TIMEOUT, async {
        let (base, seen) = start_backend(CardReply::Recommended).await;
        let rec = client(&base)
            .request_recommendation(&request("groceries"))
            .await
            .unwrap();

        assert_eq!(rec.card, "No-Fee Cashback Card");
        assert_eq!(rec.reason, "Best for student grocery spending");
        assert_eq!(rec.source, ResponseShape::RecommendedCard);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["is_student"], true);
        assert_eq!(seen[0]["primary_spend"], "groceries");
        assert_eq!(seen[0]["priority"], "cashback");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn use_card_shape_is_normalized() {
    timeout(TEST_TIMEOUT, async {
        let (base, _seen) = start_backend(CardReply::UseCard).await;
        let rec = client(&base)
            .request_recommendation(&request("Dining"))
            .await
            .unwrap();
        assert_eq!(rec.card, "Avion Points Card");
        assert_eq!(rec.source, ResponseShape::UseCard);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn error_body_becomes_the_message() {
    timeout(TEST_TIMEOUT, async {
        let (base, _seen) = start_backend(CardReply::ServerError).await;
        let err = client(&base)
            .request_recommendation(&request("Dining"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RequestError::Rejected {
                status: 500,
                message: "Internal Server Error".to_string(),
            }
        );
        assert_eq!(err.user_message(), "Internal Server Error");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn empty_error_body_falls_back_to_status() {
    timeout(TEST_TIMEOUT, async {
        let (base, _seen) = start_backend(CardReply::EmptyError).await;
        let err = client(&base)
            .request_recommendation(&request("Dining"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Request failed: 500");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn unexpected_shape_is_invalid_response() {
    timeout(TEST_TIMEOUT, async {
        let (base, _seen) = start_backend(CardReply::Malformed).await;
        let err = client(&base)
            .request_recommendation(&request("Dining"))
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidResponse(_)));
        assert_ne!(err.user_message(), GENERIC_REQUEST_FAILURE);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn transaction_advice_above_threshold() {
    timeout(TEST_TIMEOUT, async {
        let (base, _seen) = start_backend(CardReply::Recommended).await;
        let c = client(&base);

        let advice = c
            .request_transaction_advice(&Transaction {
                category: "Electronics".to_string(),
                amount: dec!(799.99),
            })
            .await
            .unwrap();
        assert_eq!(advice.card, "Avion Points Card");
        assert_eq!(advice.source, ResponseShape::UseCard);

        // At or below the threshold the backend answers `null`.
        let err = c
            .request_transaction_advice(&Transaction {
                category: "Coffee".to_string(),
                amount: dec!(4.50),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidResponse(_)));
    })
    .await
    .expect("test timed out");
}
