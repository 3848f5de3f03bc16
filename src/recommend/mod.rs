//! Recommendation backend boundary.
//!
//! The backend answers with one of two JSON shapes; both are decoded here and
//! normalized into a single [`Recommendation`] before reaching the wizard.

pub mod client;
pub mod model;

pub use client::{HttpRecommendationClient, RecommendationClient};
pub use model::{
    HealthStatus, Recommendation, RecommendationRequest, RecommendationResponse, ResponseShape,
    Transaction,
};
