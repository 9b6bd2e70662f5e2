use serde::{Deserialize, Serialize};
use crate::models::domain::{CatDetail, UserSnapshot};

/// A match as seen by one of its two parties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub id: String,
    #[serde(rename = "issuedBy")]
    pub issued_by: UserSnapshot,
    /// The other party's cat
    #[serde(rename = "matchCatDetail")]
    pub match_cat_detail: CatDetail,
    /// The caller's own cat
    #[serde(rename = "userCatDetail")]
    pub user_cat_detail: CatDetail,
    pub message: String,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
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
