//! Form input normalization for model inference.
//!
//! This module converts the raw textual form fields into the typed
//! feature row the models expect, matching the preprocessing the models
//! were trained with. It is a pure transform: no I/O, no shared state.

use crate::error::{ScreenError, ScreenResult};
use crate::types::patient::FeatureRow;
use std::collections::HashMap;

/// Result of the gender synonym lookup.
///
/// An unrecognized token is carried through verbatim so the caller can
/// decide what to do with it; `normalize` rejects it with a validation
/// error instead of forwarding a string into a numeric feature slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gender {
    Coded(i64),
    Unrecognized(String),
}

/// Case-insensitive, whitespace-trimmed lookup against the fixed
/// synonym table the models were trained with.
pub fn parse_gender(raw: &str) -> Gender {
    let token = raw.trim();
    match token.to_lowercase().as_str() {
        "male" | "m" | "ذكر" => Gender::Coded(1),
        "female" | "f" | "أنثى" | "انثى" => Gender::Coded(0),
        _ => Gender::Unrecognized(token.to_string()),
    }
}

/// Build a [`FeatureRow`] from a raw field-name to string-value map.
///
/// Fails with a `Validation` error naming the offending field when a
/// field is missing, non-numeric, or an unrecognized gender token.
pub fn normalize(fields: &HashMap<String, String>) -> ScreenResult<FeatureRow> {
    let gender = match parse_gender(field(fields, "gender")?) {
        Gender::Coded(code) => code,
        Gender::Unrecognized(token) => {
            return Err(ScreenError::Validation {
                field: "gender",
                message: format!("unrecognized gender \"{token}\""),
            })
        }
    };

    Ok(FeatureRow {
        gender,
        age: parse_float(fields, "age")?,
        hypertension: parse_flag(fields, "hypertension")?,
        heart_disease: parse_flag(fields, "heart_disease")?,
        smoking_history: field(fields, "smoking_history")?.trim().to_string(),
        bmi: parse_float(fields, "bmi")?,
        hba1c_level: parse_float(fields, "HbA1c_level")?,
        blood_glucose_level: parse_float(fields, "blood_glucose_level")?,
    })
}

fn field<'a>(
    fields: &'a HashMap<String, String>,
    name: &'static str,
) -> ScreenResult<&'a str> {
    fields
        .get(name)
        .map(|value| value.as_str())
        .ok_or(ScreenError::Validation {
            field: name,
            message: "missing field".to_string(),
        })
}

fn parse_float(fields: &HashMap<String, String>, name: &'static str) -> ScreenResult<f64> {
    let raw = field(fields, name)?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ScreenError::Validation {
            field: name,
            message: format!("\"{raw}\" is not numeric"),
        })
}

/// Flag fields accept anything that parses as a float and truncate
/// toward zero, so "1", "1.0" and "1.9" all code to 1 and "-0.5" to 0.
fn parse_flag(fields: &HashMap<String, String>, name: &'static str) -> ScreenResult<i64> {
    Ok(parse_float(fields, name)? as i64)
}
