//! Patient feature row handed to every model

use serde::{Deserialize, Serialize};

/// Form field names, in the schema order the models were trained on.
pub const FORM_FIELDS: [&str; 8] = [
    "gender",
    "age",
    "hypertension",
    "heart_disease",
    "smoking_history",
    "bmi",
    "HbA1c_level",
    "blood_glucose_level",
];

/// A fully normalized patient record.
///
/// Every field is present and typed before the ensemble ever sees it;
/// no partially filled row exists anywhere in the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Coded gender (1 = male, 0 = female)
    pub gender: i64,

    /// Age in years
    pub age: f64,

    /// Hypertension flag (0/1)
    pub hypertension: i64,

    /// Heart disease flag (0/1)
    pub heart_disease: i64,

    /// Smoking history category, trimmed but otherwise opaque.
    /// An unseen category fails the model whose training excluded it.
    pub smoking_history: String,

    /// Body mass index
    pub bmi: f64,

    /// Glycated hemoglobin level
    #[serde(rename = "HbA1c_level")]
    pub hba1c_level: f64,

    /// Blood glucose level
    pub blood_glucose_level: f64,
}
