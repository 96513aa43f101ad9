//! Error types for the screening service

use thiserror::Error;

/// Errors surfaced by the screening pipeline.
///
/// Everything except `Startup` is caught at the request boundary and
/// rendered as a message; `Startup` is fatal and the process never serves.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// A form field was missing, non-numeric, or otherwise malformed.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// One or more models failed to score the row.
    #[error("prediction failed: {message}")]
    Prediction { message: String },

    /// The ensemble cannot produce a verdict (no models loaded).
    #[error("ensemble misconfigured: {0}")]
    Configuration(String),

    /// The model bundle is missing or unreadable. Fatal.
    #[error("startup failed: {0}")]
    Startup(String),
}

pub type ScreenResult<T> = Result<T, ScreenError>;

impl ScreenError {
    /// Short kind tag used by metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ScreenError::Validation { .. } => "validation",
            ScreenError::Prediction { .. } => "prediction",
            ScreenError::Configuration(_) => "configuration",
            ScreenError::Startup(_) => "startup",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_field() {
        let err = ScreenError::Validation {
            field: "age",
            message: "\"abc\" is not numeric".to_string(),
        };
        assert_eq!(err.to_string(), "invalid age: \"abc\" is not numeric");
        assert_eq!(err.kind(), "validation");
    }
}
