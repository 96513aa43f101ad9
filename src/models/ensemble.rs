//! Majority-vote ensemble over the loaded models.
//!
//! The ensemble is built once at startup and shared read-only across
//! requests; voting takes `&self` and touches no shared mutable state.

use crate::config::VotePolicy;
use crate::error::{ScreenError, ScreenResult};
use crate::models::classifier::{BinaryClassifier, ModelError};
use crate::models::loader::LoadedModel;
use crate::types::patient::FeatureRow;
use tracing::{debug, warn};

/// One model's binary vote on a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    /// Name of the model that cast the vote
    pub model: String,
    /// 1 for the positive class, 0 otherwise
    pub value: u8,
}

impl Vote {
    pub fn new(model: impl Into<String>, value: u8) -> Self {
        Self {
            model: model.into(),
            value,
        }
    }
}

/// Fixed collection of models evaluated together on the same input
pub struct VoteEnsemble {
    models: Vec<LoadedModel>,
    policy: VotePolicy,
}

impl VoteEnsemble {
    pub fn new(models: Vec<LoadedModel>, policy: VotePolicy) -> Self {
        Self { models, policy }
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn model_names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.name.clone()).collect()
    }

    pub fn policy(&self) -> &VotePolicy {
        &self.policy
    }

    /// Cast one vote per model, in bundle order.
    ///
    /// Each model call is independently fallible. Under the `strict`
    /// policy any failure fails the vote, with every failed model named;
    /// under `quorum` failed models are skipped as long as strictly more
    /// than half of the loaded models produced a vote.
    pub fn vote(&self, row: &FeatureRow) -> ScreenResult<Vec<Vote>> {
        if self.models.is_empty() {
            return Err(ScreenError::Configuration(
                "no models loaded, refusing to vote".to_string(),
            ));
        }

        let mut votes = Vec::with_capacity(self.models.len());
        let mut failures: Vec<(String, ModelError)> = Vec::new();

        for loaded in &self.models {
            match cast_vote(loaded, row) {
                Ok(value) => {
                    debug!(model = %loaded.name, vote = value, "Vote cast");
                    votes.push(Vote::new(loaded.name.clone(), value));
                }
                Err(e) => {
                    warn!(model = %loaded.name, error = %e, "Model failed to score the row");
                    failures.push((loaded.name.clone(), e));
                }
            }
        }

        match self.policy {
            VotePolicy::Strict if !failures.is_empty() => {
                Err(ScreenError::Prediction {
                    message: describe_failures(&failures),
                })
            }
            VotePolicy::Quorum if votes.len() * 2 <= self.models.len() => {
                Err(ScreenError::Prediction {
                    message: format!(
                        "only {} of {} models voted, below quorum: {}",
                        votes.len(),
                        self.models.len(),
                        describe_failures(&failures)
                    ),
                })
            }
            _ => Ok(votes),
        }
    }
}

/// Decision rule applied uniformly to every model: probability at or
/// above 0.5 is a positive vote when the model exposes one, otherwise
/// the direct label coerced to {0, 1}.
fn cast_vote(loaded: &LoadedModel, row: &FeatureRow) -> Result<u8, ModelError> {
    let features = loaded.feature_vector(row)?;
    match loaded.model.predict_proba(&features)? {
        Some(proba) => Ok(u8::from(proba >= 0.5)),
        None => loaded.model.predict_label(&features),
    }
}

fn describe_failures(failures: &[(String, ModelError)]) -> String {
    failures
        .iter()
        .map(|(name, e)| format!("{name}: {e}"))
        .collect::<Vec<_>>()
        .join("; ")
}
