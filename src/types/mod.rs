//! Type definitions for the screening service

pub mod patient;
pub mod verdict;

pub use patient::FeatureRow;
pub use verdict::{Outcome, Verdict, VoteTally};
