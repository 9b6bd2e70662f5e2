use crate::core::error::MatchError;
use crate::models::Cat;

/// Accepted length range for a proposal message, in characters
#[derive(Debug, Clone, Copy)]
pub struct MessageBounds {
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for MessageBounds {
    fn default() -> Self {
        Self {
            min_len: 5,
            max_len: 120,
        }
    }
}

/// A loaded issuer/target pair plus the message to send along
#[derive(Debug, Clone, Copy)]
pub struct Proposal<'a> {
    pub issuer: &'a Cat,
    pub target: &'a Cat,
    pub message: &'a str,
}

type Rule = fn(&Proposal<'_>, &MessageBounds) -> Result<(), MatchError>;

/// Checks run after both cats have been loaded, in order.
/// The first failing rule decides the error.
const RULES: [Rule; 4] = [
    distinct_owners,
    opposite_sex,
    neither_matched,
    message_within_bounds,
];

/// Run the eligibility pipeline over a proposal
pub fn check_eligibility(proposal: &Proposal<'_>, bounds: &MessageBounds) -> Result<(), MatchError> {
    RULES.iter().try_for_each(|rule| rule(proposal, bounds))
}

#[inline]
fn distinct_owners(p: &Proposal<'_>, _: &MessageBounds) -> Result<(), MatchError> {
    if p.issuer.user_id == p.target.user_id {
        return Err(MatchError::SameOwner);
    }
    Ok(())
}

#[inline]
fn opposite_sex(p: &Proposal<'_>, _: &MessageBounds) -> Result<(), MatchError> {
    if p.issuer.sex == p.target.sex {
        return Err(MatchError::SameSex);
    }
    Ok(())
}

#[inline]
fn neither_matched(p: &Proposal<'_>, _: &MessageBounds) -> Result<(), MatchError> {
    if p.issuer.has_matched || p.target.has_matched {
        return Err(MatchError::AlreadyMatched);
    }
    Ok(())
}

#[inline]
fn message_within_bounds(p: &Proposal<'_>, bounds: &MessageBounds) -> Result<(), MatchError> {
    if p.message.trim().is_empty() {
        return Err(MatchError::ValidationFailed("message is required".to_string()));
    }

    let len = p.message.chars().count();
    if len < bounds.min_len || len > bounds.max_len {
        return Err(MatchError::ValidationFailed(format!(
            "message must be between {} and {} characters",
            bounds.min_len, bounds.max_len
        )));
    }

    Ok(())
}
