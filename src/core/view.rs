use crate::models::{MatchListing, MatchResponse};

/// Turn an issuer/target listing into the caller's "my cat / other cat" view
///
/// The caller's cat is the issuer cat when the caller issued the proposal,
/// and the target cat otherwise.
pub fn reorient(listing: MatchListing, user_id: i64) -> MatchResponse {
    let (user_cat, match_cat) = if listing.issued_by.id == user_id {
        (listing.issuer_cat, listing.target_cat)
    } else {
        (listing.target_cat, listing.issuer_cat)
    };

    MatchResponse {
        id: listing.id,
        issued_by: listing.issued_by,
        match_cat_detail: match_cat,
        user_cat_detail: user_cat,
        message: listing.message,
        created_at: listing.created_at,
    }
}

/// Reorient every listing, keeping the incoming order
pub fn reorient_all(listings: Vec<MatchListing>, user_id: i64) -> Vec<MatchResponse> {
    listings
        .into_iter()
        .map(|listing| reorient(listing, user_id))
        .collect()
}
