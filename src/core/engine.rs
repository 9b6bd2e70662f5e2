use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::core::{
    eligibility::{check_eligibility, MessageBounds, Proposal},
    error::MatchError,
    ports::{MatchRepository, ProfileStore},
    view::reorient_all,
};
use crate::models::{CreateMatchRequest, MatchParty, MatchResponse, NewMatch};

/// Match lifecycle orchestrator
///
/// # Lifecycle
/// 1. `create` runs the eligibility pipeline and stores a pending proposal
/// 2. `approve` (target owner) applies the matched-cat cascade atomically
/// 3. `reject` (target owner) closes the proposal without side effects
/// 4. `withdraw` (issuer) deletes a proposal that is still pending
///
/// The engine holds no locks of its own; all serialization happens in the
/// repository.
#[derive(Clone)]
pub struct MatchEngine {
    matches: Arc<dyn MatchRepository>,
    profiles: Arc<dyn ProfileStore>,
    bounds: MessageBounds,
}

impl MatchEngine {
    pub fn new(
        matches: Arc<dyn MatchRepository>,
        profiles: Arc<dyn ProfileStore>,
        bounds: MessageBounds,
    ) -> Self {
        Self {
            matches,
            profiles,
            bounds,
        }
    }

    /// Propose a match from one of `user_id`'s cats to any other cat
    ///
    /// The issuer cat is looked up scoped to the caller while the target cat
    /// is looked up globally. Returns the id of the new pending match.
    pub async fn create(&self, user_id: i64, req: &CreateMatchRequest) -> Result<String, MatchError> {
        let issuer = self
            .profiles
            .get_cat_for_user(&req.user_cat_id, user_id)
            .await?;
        let target = self.profiles.get_cat(&req.match_cat_id).await?;

        let proposal = Proposal {
            issuer: &issuer,
            target: &target,
            message: &req.message,
        };
        if let Err(e) = check_eligibility(&proposal, &self.bounds) {
            debug!(
                "Rejected proposal {} -> {} by user {}: {}",
                issuer.id, target.id, user_id, e
            );
            return Err(e);
        }

        let new_match = NewMatch {
            id: Uuid::new_v4().to_string(),
            issuer_cat_id: issuer.id,
            issuer_user_id: user_id,
            target_cat_id: target.id,
            target_user_id: target.user_id,
            message: req.message.clone(),
        };

        let id = self.matches.create_pending(&new_match).await?;

        info!(
            "Created match {}: cat {} (user {}) -> cat {} (user {})",
            id,
            new_match.issuer_cat_id,
            user_id,
            new_match.target_cat_id,
            new_match.target_user_id
        );

        Ok(id)
    }

    /// Approve a pending match received by `user_id`
    pub async fn approve(&self, user_id: i64, match_id: &str) -> Result<(), MatchError> {
        let cat_match = self
            .matches
            .get_by_id_for_user(match_id, user_id, MatchParty::Target, true)
            .await?;

        self.matches.approve_with_cascade(&cat_match).await?;

        info!(
            "Approved match {}: cats {} and {} are now matched",
            cat_match.id, cat_match.issuer_cat_id, cat_match.target_cat_id
        );

        Ok(())
    }

    /// Reject a pending match received by `user_id`
    pub async fn reject(&self, user_id: i64, match_id: &str) -> Result<(), MatchError> {
        let cat_match = self
            .matches
            .get_by_id_for_user(match_id, user_id, MatchParty::Target, true)
            .await?;

        self.matches.reject(&cat_match).await?;

        info!("Rejected match {} by user {}", cat_match.id, user_id);

        Ok(())
    }

    /// Withdraw a pending match issued by `user_id`
    pub async fn withdraw(&self, user_id: i64, match_id: &str) -> Result<(), MatchError> {
        let cat_match = self
            .matches
            .get_by_id_for_user(match_id, user_id, MatchParty::Issuer, true)
            .await?;

        self.matches.delete(cat_match.seq, user_id).await?;

        info!("Withdrew match {} by user {}", cat_match.id, user_id);

        Ok(())
    }

    /// All matches `user_id` issued or received, newest first, from the
    /// caller's point of view
    pub async fn list(&self, user_id: i64) -> Result<Vec<MatchResponse>, MatchError> {
        let listings = self.matches.list(user_id).await?;

        debug!("User {} has {} matches", user_id, listings.len());

        Ok(reorient_all(listings, user_id))
    }

    /// Whether the backing store is reachable
    pub async fn health(&self) -> bool {
        self.matches.health_check().await.unwrap_or(false)
    }
}
