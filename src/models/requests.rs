use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to propose a match between one of the caller's cats and another cat
///
/// Message bounds are checked by the engine after eligibility, so only the
/// identifiers are validated here.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMatchRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "match_cat_id", rename = "matchCatId")]
    pub match_cat_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "user_cat_id", rename = "userCatId")]
    pub user_cat_id: String,
    #[serde(default)]
    pub message: String,
}

/// Request to approve or reject a received match
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DecideMatchRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "match_id", rename = "matchId")]
    pub match_id: String,
}
