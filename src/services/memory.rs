//! In-memory profile store and match repository
//!
//! Every operation takes the same mutex, so the approval cascade is
//! applied as one step just like the PostgreSQL transaction.
//! Used by the test suite and for running without a database.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::core::{MatchError, MatchRepository, ProfileStore};
use crate::models::{Cat, CatDetail, CatMatch, MatchListing, MatchParty, MatchStatus, NewMatch, UserSnapshot};

#[derive(Default)]
struct State {
    users: HashMap<i64, UserSnapshot>,
    cats: HashMap<String, Cat>,
    matches: Vec<CatMatch>,
    next_seq: i64,
}

impl State {
    fn mark_matched(&mut self, cat_id: &str) -> Result<(), MatchError> {
        let cat = self.cats.get_mut(cat_id).ok_or_else(MatchError::cat_not_found)?;
        cat.has_matched = true;
        Ok(())
    }

    fn find_match(&self, seq: i64) -> Option<&CatMatch> {
        self.matches.iter().find(|m| m.seq == seq)
    }
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user record
    pub async fn insert_user(&self, user: UserSnapshot) {
        self.state.lock().await.users.insert(user.id, user);
    }

    /// Seed a cat record
    pub async fn insert_cat(&self, cat: Cat) {
        self.state.lock().await.cats.insert(cat.id.clone(), cat);
    }

    /// Current copy of a cat, if present
    pub async fn cat(&self, cat_id: &str) -> Option<Cat> {
        self.state.lock().await.cats.get(cat_id).cloned()
    }

    /// Current status of a match by public id, if present
    pub async fn match_status(&self, match_id: &str) -> Option<MatchStatus> {
        self.state
            .lock()
            .await
            .matches
            .iter()
            .find(|m| m.id == match_id)
            .map(|m| m.status)
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn get_cat_for_user(&self, cat_id: &str, user_id: i64) -> Result<Cat, MatchError> {
        let state = self.state.lock().await;
        state
            .cats
            .get(cat_id)
            .filter(|cat| cat.user_id == user_id)
            .cloned()
            .ok_or_else(MatchError::cat_not_found)
    }

    async fn get_cat(&self, cat_id: &str) -> Result<Cat, MatchError> {
        let state = self.state.lock().await;
        state.cats.get(cat_id).cloned().ok_or_else(MatchError::cat_not_found)
    }
}

#[async_trait]
impl MatchRepository for InMemoryStore {
    async fn create_pending(&self, new_match: &NewMatch) -> Result<String, MatchError> {
        let mut state = self.state.lock().await;

        // Re-checked under the lock: an approval may have landed since the engine read the cats
        for cat_id in [&new_match.issuer_cat_id, &new_match.target_cat_id] {
            let cat = state.cats.get(cat_id.as_str()).ok_or_else(MatchError::cat_not_found)?;
            if cat.has_matched {
                return Err(MatchError::AlreadyMatched);
            }
        }

        state.next_seq += 1;
        let seq = state.next_seq;
        state.matches.push(CatMatch {
            seq,
            id: new_match.id.clone(),
            issuer_cat_id: new_match.issuer_cat_id.clone(),
            issuer_user_id: new_match.issuer_user_id,
            target_cat_id: new_match.target_cat_id.clone(),
            target_user_id: new_match.target_user_id,
            message: new_match.message.clone(),
            status: MatchStatus::Pending,
            created_at: Utc::now(),
        });

        Ok(new_match.id.clone())
    }

    async fn approve_with_cascade(&self, cat_match: &CatMatch) -> Result<(), MatchError> {
        let mut state = self.state.lock().await;

        // Validate everything before the first write so a failure leaves no trace
        let current = state
            .find_match(cat_match.seq)
            .ok_or_else(MatchError::match_not_found)?;
        if !current.status.is_pending() {
            return Err(MatchError::NoLongerValid);
        }
        for cat_id in [&cat_match.issuer_cat_id, &cat_match.target_cat_id] {
            let cat = state.cats.get(cat_id.as_str()).ok_or_else(MatchError::cat_not_found)?;
            if cat.has_matched {
                return Err(MatchError::AlreadyMatched);
            }
        }

        state.mark_matched(&cat_match.issuer_cat_id)?;
        state.mark_matched(&cat_match.target_cat_id)?;

        for m in state.matches.iter_mut() {
            if m.seq == cat_match.seq {
                m.status = MatchStatus::Approved;
            } else if m.involves_cat(&cat_match.issuer_cat_id) || m.involves_cat(&cat_match.target_cat_id) {
                m.status = MatchStatus::Rejected;
            }
        }

        Ok(())
    }

    async fn reject(&self, cat_match: &CatMatch) -> Result<(), MatchError> {
        let mut state = self.state.lock().await;

        let current = state
            .matches
            .iter_mut()
            .find(|m| m.seq == cat_match.seq)
            .ok_or_else(MatchError::match_not_found)?;
        if !current.status.is_pending() {
            return Err(MatchError::NoLongerValid);
        }

        current.status = MatchStatus::Rejected;
        Ok(())
    }

    async fn delete(&self, match_seq: i64, issuer_user_id: i64) -> Result<(), MatchError> {
        let mut state = self.state.lock().await;

        let position = state
            .matches
            .iter()
            .position(|m| m.seq == match_seq && m.issuer_user_id == issuer_user_id);

        match position {
            None => Ok(()),
            Some(idx) if !state.matches[idx].status.is_pending() => Err(MatchError::NoLongerValid),
            Some(idx) => {
                state.matches.remove(idx);
                Ok(())
            }
        }
    }

    async fn get_by_id_for_user(
        &self,
        match_id: &str,
        user_id: i64,
        party: MatchParty,
        pending_only: bool,
    ) -> Result<CatMatch, MatchError> {
        let state = self.state.lock().await;

        let cat_match = state
            .matches
            .iter()
            .find(|m| {
                m.id == match_id
                    && match party {
                        MatchParty::Issuer => m.issuer_user_id == user_id,
                        MatchParty::Target => m.target_user_id == user_id,
                    }
            })
            .cloned()
            .ok_or_else(MatchError::match_not_found)?;

        if pending_only && !cat_match.status.is_pending() {
            return Err(MatchError::NoLongerValid);
        }

        Ok(cat_match)
    }

    async fn list(&self, user_id: i64) -> Result<Vec<MatchListing>, MatchError> {
        let state = self.state.lock().await;

        let mut rows: Vec<&CatMatch> = state
            .matches
            .iter()
            .filter(|m| m.issuer_user_id == user_id || m.target_user_id == user_id)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.seq.cmp(&a.seq)));

        // Rows whose issuer or cats are missing are skipped, as the inner joins do in SQL
        let listings = rows
            .into_iter()
            .filter_map(|m| {
                let issued_by = state.users.get(&m.issuer_user_id)?.clone();
                let issuer_cat = state.cats.get(&m.issuer_cat_id)?;
                let target_cat = state.cats.get(&m.target_cat_id)?;

                Some(MatchListing {
                    id: m.id.clone(),
                    issued_by,
                    issuer_cat: CatDetail::from(issuer_cat),
                    target_cat: CatDetail::from(target_cat),
                    message: m.message.clone(),
                    created_at: m.created_at,
                })
            })
            .collect();

        Ok(listings)
    }

    async fn health_check(&self) -> Result<bool, MatchError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatSex;

    fn cat(id: &str, user_id: i64, sex: CatSex, has_matched: bool) -> Cat {
        Cat {
            id: id.to_string(),
            user_id,
            name: id.to_string(),
            race: "Persian".to_string(),
            sex,
            age_in_month: 12,
            description: "sleepy".to_string(),
            image_urls: vec![],
            has_matched,
            created_at: Utc::now(),
        }
    }

    fn user(id: i64) -> UserSnapshot {
        UserSnapshot {
            id,
            name: format!("User {}", id),
            email: format!("user{}@example.com", id),
            created_at: Utc::now(),
        }
    }

    fn new_match(id: &str, issuer: (&str, i64), target: (&str, i64)) -> NewMatch {
        NewMatch {
            id: id.to_string(),
            issuer_cat_id: issuer.0.to_string(),
            issuer_user_id: issuer.1,
            target_cat_id: target.0.to_string(),
            target_user_id: target.1,
            message: "hello there".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_pending_refuses_matched_cat() {
        let store = InMemoryStore::new();
        store.insert_cat(cat("A", 1, CatSex::Male, false)).await;
        store.insert_cat(cat("B", 2, CatSex::Female, true)).await;

        let err = store
            .create_pending(&new_match("m1", ("A", 1), ("B", 2)))
            .await
            .unwrap_err();

        assert!(matches!(err, MatchError::AlreadyMatched));
        assert_eq!(store.match_status("m1").await, None);
    }

    #[tokio::test]
    async fn test_list_skips_rows_without_issuer_user() {
        let store = InMemoryStore::new();
        store.insert_user(user(2)).await;
        store.insert_cat(cat("A", 1, CatSex::Male, false)).await;
        store.insert_cat(cat("B", 2, CatSex::Female, false)).await;
        store.insert_cat(cat("D", 2, CatSex::Female, false)).await;
        store.insert_cat(cat("C", 3, CatSex::Male, false)).await;

        // User 1 was never seeded
        store.create_pending(&new_match("m1", ("A", 1), ("B", 2))).await.unwrap();
        store.create_pending(&new_match("m2", ("D", 2), ("C", 3))).await.unwrap();

        let listings = store.list(2).await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, "m2");
    }
}
