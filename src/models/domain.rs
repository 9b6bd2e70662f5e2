use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sex of a registered cat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "cat_sex", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CatSex {
    Male,
    Female,
}

/// Cat profile as held by the profile store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cat {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub name: String,
    pub race: String,
    pub sex: CatSex,
    #[serde(rename = "ageInMonth")]
    pub age_in_month: i32,
    pub description: String,
    #[serde(rename = "imageUrls", default)]
    pub image_urls: Vec<String>,
    #[serde(rename = "hasMatched", default)]
    pub has_matched: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Approval state of a match proposal.
///
/// Transitions are one-way: `Pending` moves to `Approved` or `Rejected`
/// and never back. A withdrawn proposal is removed instead of getting a
/// status of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Approved,
    Rejected,
}

impl MatchStatus {
    pub fn is_pending(self) -> bool {
        self == MatchStatus::Pending
    }
}

/// A persisted match proposal between two cats
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatMatch {
    /// Internal sequence key, used for row updates and cascade joins
    #[serde(skip)]
    pub seq: i64,
    pub id: String,
    pub issuer_cat_id: String,
    pub issuer_user_id: i64,
    pub target_cat_id: String,
    pub target_user_id: i64,
    pub message: String,
    pub status: MatchStatus,
    pub created_at: DateTime<Utc>,
}

impl CatMatch {
    /// Whether the given cat takes part in this match on either side
    pub fn involves_cat(&self, cat_id: &str) -> bool {
        self.issuer_cat_id == cat_id || self.target_cat_id == cat_id
    }
}

/// A proposal that passed eligibility and is about to be stored as pending
#[derive(Debug, Clone)]
pub struct NewMatch {
    pub id: String,
    pub issuer_cat_id: String,
    pub issuer_user_id: i64,
    pub target_cat_id: String,
    pub target_user_id: i64,
    pub message: String,
}

/// Which side of a match a user is acting as when loading it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchParty {
    /// The user who issued the proposal (may withdraw it)
    Issuer,
    /// The owner of the proposed cat (may approve or reject it)
    Target,
}

/// Public snapshot of a user, embedded as `issuedBy` in match listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSnapshot {
    #[serde(skip)]
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Cat profile snapshot as shown in match listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatDetail {
    pub id: String,
    pub name: String,
    pub race: String,
    pub sex: CatSex,
    #[serde(rename = "ageInMonth")]
    pub age_in_month: i32,
    #[serde(rename = "imageUrls")]
    pub image_urls: Vec<String>,
    pub description: String,
    #[serde(rename = "hasMatched")]
    pub has_matched: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<&Cat> for CatDetail {
    fn from(cat: &Cat) -> Self {
        Self {
            id: cat.id.clone(),
            name: cat.name.clone(),
            race: cat.race.clone(),
            sex: cat.sex,
            age_in_month: cat.age_in_month,
            image_urls: cat.image_urls.clone(),
            description: cat.description.clone(),
            has_matched: cat.has_matched,
            created_at: cat.created_at,
        }
    }
}

/// A match joined with both cat snapshots and the issuing user,
/// still in issuer/target orientation
#[derive(Debug, Clone)]
pub struct MatchListing {
    pub id: String,
    pub issued_by: UserSnapshot,
    pub issuer_cat: CatDetail,
    pub target_cat: CatDetail,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
