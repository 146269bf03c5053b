use serde::{Deserialize, Serialize};
use crate::models::domain::SkippedRow;

/// Response for the process endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    #[serde(rename = "runId")]
    pub run_id: String,
    #[serde(rename = "matchCount")]
    pub match_count: usize,
    #[serde(rename = "pointsA")]
    pub points_a: usize,
    #[serde(rename = "pointsB")]
    pub points_b: usize,
    #[serde(rename = "skippedA")]
    pub skipped_a: Vec<SkippedRow>,
    #[serde(rename = "skippedB")]
    pub skipped_b: Vec<SkippedRow>,
    #[serde(rename = "downloadUrl")]
    pub download_url: String,
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
