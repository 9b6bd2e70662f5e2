// Core match lifecycle exports
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod ports;
pub mod view;

pub use eligibility::{check_eligibility, MessageBounds, Proposal};
pub use engine::MatchEngine;
pub use error::MatchError;
pub use ports::{MatchRepository, ProfileStore};
pub use view::{reorient, reorient_all};
