//! Vote aggregation: majority rule over the ensemble's votes

use crate::error::{ScreenError, ScreenResult};
use crate::models::ensemble::Vote;
use crate::types::verdict::{Outcome, Verdict, VoteTally};

/// Count positive and negative votes.
pub fn tally(votes: &[Vote]) -> VoteTally {
    let positives = votes.iter().filter(|vote| vote.value == 1).count();
    VoteTally {
        positives,
        negatives: votes.len() - positives,
        total: votes.len(),
    }
}

/// Reduce a vote sequence to a majority verdict.
///
/// Ties resolve to positive. An empty sequence fails with a
/// `Configuration` error: zero models must never default to a verdict,
/// since 0 >= 0 would silently declare the positive class.
pub fn aggregate(votes: &[Vote]) -> ScreenResult<Verdict> {
    if votes.is_empty() {
        return Err(ScreenError::Configuration(
            "refusing to declare a majority over zero votes".to_string(),
        ));
    }

    let tally = tally(votes);
    let outcome = Outcome::from_tally(tally.positives, tally.negatives);
    Ok(Verdict::new(outcome, tally))
}
