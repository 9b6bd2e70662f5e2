//! Cats Social - match lifecycle service
//!
//! Owners propose pairings between their cats and other users' cats. This
//! library holds the engine that gates proposals, drives them from pending
//! to approved, rejected or withdrawn, and keeps every competing proposal
//! consistent when a pair is approved.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{MatchEngine, MatchError, MatchRepository, MessageBounds, ProfileStore};
pub use crate::models::{Cat, CatSex, CatMatch, MatchStatus, MatchResponse, CreateMatchRequest};
pub use crate::services::InMemoryStore;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let bounds = MessageBounds::default();
        assert!(bounds.min_len < bounds.max_len);
        assert!(MatchStatus::Pending.is_pending());
    }
}
