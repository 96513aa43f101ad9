//! Diabetes Screening Service Library
//!
//! Accepts patient attributes through a web form, evaluates them
//! against an ensemble of pre-trained binary classifiers, and reduces
//! the per-model votes to a majority verdict.

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod normalizer;
pub mod render;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::{ScreenError, ScreenResult};
pub use metrics::ScreenerMetrics;
pub use models::{ModelLoader, VoteEnsemble};
pub use types::{patient::FeatureRow, verdict::Verdict};
