use serde::{Deserialize, Serialize};
use crate::models::domain::{CatalogService, VendorCandidate};

/// Response for both recommendation endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(rename = "requestId")]
    pub request_id: String,
    pub vendors: Vec<VendorCandidate>,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
    pub summary: Option<String>,
}

/// Response for the service matching endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchServicesResponse {
    pub services: Vec<CatalogService>,
    #[serde(rename = "usedKeywordFallback")]
    pub used_keyword_fallback: bool,
    pub unmatched: Vec<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
