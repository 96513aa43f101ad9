//! Verdict and vote tally data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Majority outcome of an ensemble vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Diabetes,
    NoDiabetes,
}

impl Outcome {
    /// Majority rule: positive when positive votes are at least as
    /// numerous as negative votes. Ties resolve to positive.
    pub fn from_tally(positives: usize, negatives: usize) -> Self {
        if positives >= negatives {
            Outcome::Diabetes
        } else {
            Outcome::NoDiabetes
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Diabetes => write!(f, "Diabetes"),
            Outcome::NoDiabetes => write!(f, "No Diabetes"),
        }
    }
}

/// Per-request vote counts, discarded after the response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    /// Number of positive votes
    pub positives: usize,
    /// Number of negative votes
    pub negatives: usize,
    /// Number of models that voted
    pub total: usize,
}

/// Majority verdict plus the tally it was computed from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// Majority label
    pub outcome: Outcome,

    /// The vote counts behind the outcome
    pub tally: VoteTally,

    /// When the verdict was computed
    pub timestamp: DateTime<Utc>,
}

impl Verdict {
    pub fn new(outcome: Outcome, tally: VoteTally) -> Self {
        Self {
            outcome,
            tally,
            timestamp: Utc::now(),
        }
    }
}
