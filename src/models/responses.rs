use serde::{Deserialize, Serialize};
use crate::core::exchange::ExchangeSuggestion;
use crate::models::domain::{CargoRoute, ExchangeCandidate, MatchResult};

/// Response for the find / preview matches endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    pub route: CargoRoute,
    pub matches: Vec<MatchResult>,
    pub total_candidates: usize,
}

/// Response for the exchange points endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangePointsResponse {
    pub candidates: Vec<ExchangeCandidate>,
    pub suggestion: ExchangeSuggestion,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub routes: usize,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
