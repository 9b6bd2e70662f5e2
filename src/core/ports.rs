//! Storage ports consumed by the match engine
//!
//! Two backends implement them:
//! - PostgreSQL (`services::postgres`) for the deployed service
//! - InMemory (`services::memory`) for tests and database-less runs

use async_trait::async_trait;

use crate::core::error::MatchError;
use crate::models::{Cat, CatMatch, MatchListing, MatchParty, NewMatch};

/// Read access to cat profiles.
///
/// Marking a cat as matched is not part of this trait: it only ever happens
/// inside the approval cascade, so each backend performs it within its own
/// transaction.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load a cat that must belong to `user_id`
    async fn get_cat_for_user(&self, cat_id: &str, user_id: i64) -> Result<Cat, MatchError>;

    /// Load any cat by id, regardless of owner
    async fn get_cat(&self, cat_id: &str) -> Result<Cat, MatchError>;
}

/// Persistence for match proposals
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Store a new pending match and return its public id
    async fn create_pending(&self, new_match: &NewMatch) -> Result<String, MatchError>;

    /// Approve a match in one atomic unit:
    /// - the match becomes `Approved`
    /// - both cats get `has_matched = true`
    /// - every other match touching either cat becomes `Rejected`
    ///
    /// Fails with `NoLongerValid` if the match was decided concurrently.
    async fn approve_with_cascade(&self, cat_match: &CatMatch) -> Result<(), MatchError>;

    /// Mark a still-pending match as rejected
    async fn reject(&self, cat_match: &CatMatch) -> Result<(), MatchError>;

    /// Remove a still-pending match issued by `issuer_user_id`.
    ///
    /// Succeeds if the row is already gone, fails with `NoLongerValid`
    /// if it exists but has been decided.
    async fn delete(&self, match_seq: i64, issuer_user_id: i64) -> Result<(), MatchError>;

    /// Load a match the user takes part in as `party`
    async fn get_by_id_for_user(
        &self,
        match_id: &str,
        user_id: i64,
        party: MatchParty,
        pending_only: bool,
    ) -> Result<CatMatch, MatchError>;

    /// All matches the user issued or received, newest first
    async fn list(&self, user_id: i64) -> Result<Vec<MatchListing>, MatchError>;

    /// Health check for the backing store
    async fn health_check(&self) -> Result<bool, MatchError>;
}
