//! Trained classifier representations.
//!
//! Models are consumed, not trained, by this service: each kind here is
//! the deserialized form of a classifier exported by the training
//! pipeline, sharing the 8-feature patient schema.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of features every model consumes, in schema order:
/// gender, age, hypertension, heart_disease, smoking_history (encoded),
/// bmi, HbA1c_level, blood_glucose_level.
pub const FEATURE_COUNT: usize = 8;

/// Errors a model can raise while scoring a row
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("expected {expected} features, got {got}")]
    SchemaMismatch { expected: usize, got: usize },

    #[error("unknown smoking_history category \"{0}\"")]
    UnknownCategory(String),

    #[error("malformed tree: node index {0} out of range")]
    MalformedTree(usize),

    #[error("random forest has no trees")]
    EmptyForest,
}

/// Contract every held model satisfies: a binary label for a feature
/// vector, and optionally a positive-class probability. Implementations
/// must be deterministic for a given vector.
pub trait BinaryClassifier {
    /// Binary label in {0, 1}.
    fn predict_label(&self, features: &[f64]) -> Result<u8, ModelError>;

    /// Positive-class probability in 0..1, or `None` when this model
    /// kind has no probability output.
    fn predict_proba(&self, features: &[f64]) -> Result<Option<f64>, ModelError>;

    /// Human readable model kind
    fn kind(&self) -> &'static str;
}

/// Encoder for the `smoking_history` categorical slot.
///
/// Levels are the categories seen during training, in training order;
/// a category outside the list fails the model that holds this encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEncoder {
    levels: Vec<String>,
}

impl CategoryEncoder {
    pub fn new(levels: Vec<String>) -> Self {
        Self { levels }
    }

    /// Map a category to its training index, as an f64 feature value.
    pub fn encode(&self, category: &str) -> Option<f64> {
        self.levels
            .iter()
            .position(|level| level == category)
            .map(|index| index as f64)
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }
}

/// Logistic regression over the 8-feature row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl LogisticRegression {
    fn decision(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.weights.len() {
            return Err(ModelError::SchemaMismatch {
                expected: self.weights.len(),
                got: features.len(),
            });
        }
        let dot: f64 = self
            .weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum();
        Ok(dot + self.intercept)
    }
}

impl BinaryClassifier for LogisticRegression {
    fn predict_label(&self, features: &[f64]) -> Result<u8, ModelError> {
        let proba = self
            .predict_proba(features)?
            .unwrap_or_default();
        Ok(u8::from(proba >= 0.5))
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Option<f64>, ModelError> {
        let z = self.decision(features)?;
        Ok(Some(1.0 / (1.0 + (-z).exp())))
    }

    fn kind(&self) -> &'static str {
        "logistic_regression"
    }
}

/// One node of an array-encoded binary decision tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TreeNode {
    /// Branch: feature value <= threshold goes left, else right
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal label
    Leaf { label: u8 },
}

/// Array-encoded decision tree; evaluation starts at node 0.
/// Label-only: trees exported without calibrated leaf probabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn decide(&self, features: &[f64]) -> Result<u8, ModelError> {
        let mut index = 0usize;
        // A well-formed tree terminates within nodes.len() hops; the
        // bound also catches cycles in a corrupt bundle.
        for _ in 0..=self.nodes.len() {
            match self
                .nodes
                .get(index)
                .ok_or(ModelError::MalformedTree(index))?
            {
                TreeNode::Leaf { label } => return Ok(u8::from(*label > 0)),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value =
                        features
                            .get(*feature)
                            .ok_or(ModelError::SchemaMismatch {
                                expected: FEATURE_COUNT,
                                got: features.len(),
                            })?;
                    index = if *value <= *threshold { *left } else { *right };
                }
            }
        }
        Err(ModelError::MalformedTree(index))
    }
}

impl BinaryClassifier for DecisionTree {
    fn predict_label(&self, features: &[f64]) -> Result<u8, ModelError> {
        self.decide(features)
    }

    fn predict_proba(&self, _features: &[f64]) -> Result<Option<f64>, ModelError> {
        Ok(None)
    }

    fn kind(&self) -> &'static str {
        "decision_tree"
    }
}

/// Bagged decision trees; probability is the fraction of trees voting
/// positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub trees: Vec<DecisionTree>,
}

impl BinaryClassifier for RandomForest {
    fn predict_label(&self, features: &[f64]) -> Result<u8, ModelError> {
        let proba = self.predict_proba(features)?.unwrap_or_default();
        Ok(u8::from(proba >= 0.5))
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Option<f64>, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::EmptyForest);
        }
        let mut positive = 0usize;
        for tree in &self.trees {
            positive += usize::from(tree.decide(features)?);
        }
        Ok(Some(positive as f64 / self.trees.len() as f64))
    }

    fn kind(&self) -> &'static str {
        "random_forest"
    }
}

/// The polymorphic model held in a bundle entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelKind {
    LogisticRegression(LogisticRegression),
    DecisionTree(DecisionTree),
    RandomForest(RandomForest),
}

impl BinaryClassifier for ModelKind {
    fn predict_label(&self, features: &[f64]) -> Result<u8, ModelError> {
        match self {
            ModelKind::LogisticRegression(model) => model.predict_label(features),
            ModelKind::DecisionTree(model) => model.predict_label(features),
            ModelKind::RandomForest(model) => model.predict_label(features),
        }
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Option<f64>, ModelError> {
        match self {
            ModelKind::LogisticRegression(model) => model.predict_proba(features),
            ModelKind::DecisionTree(model) => model.predict_proba(features),
            ModelKind::RandomForest(model) => model.predict_proba(features),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ModelKind::LogisticRegression(model) => model.kind(),
            ModelKind::DecisionTree(model) => model.kind(),
            ModelKind::RandomForest(model) => model.kind(),
        }
    }
}
