//! Wire types for the recommendation backend.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RequestDefaults;
use crate::wizard::model::Merchant;

/// Body of `POST /recommend/card`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub is_student: bool,
    pub primary_spend: String,
    pub priority: String,
}

impl RecommendationRequest {
    /// Normalize a merchant selection into backend vocabulary.
    pub fn for_merchant(merchant: Merchant, defaults: &RequestDefaults) -> Self {
        Self {
            is_student: defaults.is_student,
            primary_spend: merchant.api_spend().to_string(),
            priority: defaults.priority.clone(),
        }
    }
}

/// Body of `POST /recommend/transaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub category: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// The two response shapes the backend produces.
///
/// Decoded at the client boundary and immediately converted into a
/// [`Recommendation`]; nothing past the client branches on the shape.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecommendationResponse {
    Recommended {
        recommended_card: String,
        reason: String,
    },
    UseCard {
        use_card: String,
        reason: String,
    },
}

/// Which response shape a recommendation arrived in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    RecommendedCard,
    UseCard,
}

/// A card suggestion, normalized from either response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub card: String,
    pub reason: String,
    pub source: ResponseShape,
}

impl From<RecommendationResponse> for Recommendation {
    fn from(resp: RecommendationResponse) -> Self {
        match resp {
            RecommendationResponse::Recommended {
                recommended_card,
                reason,
            } => Self {
                card: recommended_card,
                reason,
                source: ResponseShape::RecommendedCard,
            },
            RecommendationResponse::UseCard { use_card, reason } => Self {
                card: use_card,
                reason,
                source: ResponseShape::UseCard,
            },
        }
    }
}

/// Result of a liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub connected: bool,
}
