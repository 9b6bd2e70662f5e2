use crate::services::PostgresError;
use thiserror::Error;

/// Errors produced by the match engine and the stores it calls
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("cat has same user")]
    SameOwner,

    #[error("cat has same sex")]
    SameSex,

    #[error("cat has matched before")]
    AlreadyMatched,

    #[error("cat match no longer valid")]
    NoLongerValid,

    #[error("storage failure: {0}")]
    Storage(#[from] PostgresError),
}

impl MatchError {
    pub fn cat_not_found() -> Self {
        MatchError::NotFound("cat")
    }

    pub fn match_not_found() -> Self {
        MatchError::NotFound("cat match")
    }

    /// HTTP status the API layer reports for this error
    pub fn status_code(&self) -> u16 {
        match self {
            MatchError::ValidationFailed(_)
            | MatchError::SameOwner
            | MatchError::SameSex
            | MatchError::AlreadyMatched
            | MatchError::NoLongerValid => 400,
            MatchError::NotFound(_) => 404,
            MatchError::Storage(_) => 500,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, MatchError::Storage(_))
    }
}

impl From<sqlx::Error> for MatchError {
    fn from(err: sqlx::Error) -> Self {
        MatchError::Storage(PostgresError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(MatchError::SameSex.status_code(), 400);
        assert_eq!(MatchError::NoLongerValid.status_code(), 400);
        assert_eq!(MatchError::match_not_found().status_code(), 404);
        assert_eq!(
            MatchError::Storage(PostgresError::InvalidInput("x".into())).status_code(),
            500
        );
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(MatchError::cat_not_found().to_string(), "cat not found");
        assert_eq!(MatchError::match_not_found().to_string(), "cat match not found");
    }
}
