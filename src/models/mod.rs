// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Cat, CatSex, CatMatch, MatchStatus, NewMatch, MatchParty, UserSnapshot, CatDetail, MatchListing};
pub use requests::{CreateMatchRequest, DecideMatchRequest};
pub use responses::{MatchResponse, HealthResponse, ErrorResponse};
