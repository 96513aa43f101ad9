//! HTTP routes for the screening service.
//!
//! Every per-request error is caught here and rendered as a normal
//! page with a failure message; a bad submission never crashes the
//! process.

use crate::error::ScreenError;
use crate::metrics::ScreenerMetrics;
use crate::models::aggregator;
use crate::models::ensemble::VoteEnsemble;
use crate::normalizer;
use crate::render::{self, Page};
use crate::types::verdict::Verdict;
use serde::Serialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use warp::{Filter, Rejection, Reply};

/// Shared, read-only request-handling context
#[derive(Clone)]
pub struct ServerState {
    pub ensemble: Arc<VoteEnsemble>,
    pub metrics: Arc<ScreenerMetrics>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    models: usize,
}

/// Run one submission through normalize, vote, and aggregate.
pub fn screen(
    fields: &HashMap<String, String>,
    ensemble: &VoteEnsemble,
) -> Result<Verdict, ScreenError> {
    let row = normalizer::normalize(fields)?;
    let votes = ensemble.vote(&row)?;
    aggregator::aggregate(&votes)
}

/// Build the complete route tree
pub fn routes(
    state: ServerState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let index = warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::html(render::index(&Page::Fresh).into_string()));

    let predict = warp::path("predict")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::form::<HashMap<String, String>>())
        .and(with_state(state.clone()))
        .map(handle_predict);

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state))
        .map(handle_health);

    index.or(predict).or(health)
}

fn with_state(
    state: ServerState,
) -> impl Filter<Extract = (ServerState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn handle_predict(form: HashMap<String, String>, state: ServerState) -> impl Reply {
    let started = Instant::now();

    let page = match screen(&form, &state.ensemble) {
        Ok(verdict) => {
            state
                .metrics
                .record_verdict(started.elapsed(), verdict.outcome);
            info!(
                outcome = %verdict.outcome,
                positives = verdict.tally.positives,
                negatives = verdict.tally.negatives,
                models = verdict.tally.total,
                "Verdict rendered"
            );
            Page::Result(verdict)
        }
        Err(error) => {
            state.metrics.record_failure(started.elapsed(), &error);
            warn!(kind = error.kind(), error = %error, "Prediction request failed");
            Page::Failed(error.to_string())
        }
    };

    warp::reply::html(render::index(&page).into_string())
}

fn handle_health(state: ServerState) -> impl Reply {
    warp::reply::json(&HealthResponse {
        status: "ok".to_string(),
        models: state.ensemble.model_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VotePolicy;
    use crate::models::classifier::{
        CategoryEncoder, DecisionTree, LogisticRegression, ModelKind, TreeNode,
    };
    use crate::models::loader::LoadedModel;

    fn positive_model(name: &str) -> LoadedModel {
        LoadedModel {
            name: name.to_string(),
            encoder: CategoryEncoder::new(vec!["never".to_string()]),
            model: ModelKind::LogisticRegression(LogisticRegression {
                weights: vec![0.0; 8],
                intercept: 5.0,
            }),
        }
    }

    fn negative_model(name: &str) -> LoadedModel {
        LoadedModel {
            name: name.to_string(),
            encoder: CategoryEncoder::new(vec!["never".to_string()]),
            model: ModelKind::DecisionTree(DecisionTree {
                nodes: vec![TreeNode::Leaf { label: 0 }],
            }),
        }
    }

    fn test_state(models: Vec<LoadedModel>) -> ServerState {
        ServerState {
            ensemble: Arc::new(VoteEnsemble::new(models, VotePolicy::Quorum)),
            metrics: Arc::new(ScreenerMetrics::new()),
        }
    }

    const VALID_FORM: &str = "gender=female&age=44&hypertension=0&heart_disease=0\
                              &smoking_history=never&bmi=27.3&HbA1c_level=5.9\
                              &blood_glucose_level=130";

    #[tokio::test]
    async fn test_first_load_shows_no_result() {
        let filter = routes(test_state(vec![positive_model("a")]));

        let res = warp::test::request().path("/").reply(&filter).await;
        let body = String::from_utf8_lossy(res.body()).to_string();

        assert_eq!(res.status(), 200);
        assert!(!body.contains("class=\"verdict\""));
        assert!(!body.contains("class=\"failure\""));
    }

    #[tokio::test]
    async fn test_split_vote_ties_to_diabetes() {
        let filter = routes(test_state(vec![
            positive_model("logreg"),
            negative_model("tree"),
        ]));

        let res = warp::test::request()
            .method("POST")
            .path("/predict")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(VALID_FORM)
            .reply(&filter)
            .await;
        let body = String::from_utf8_lossy(res.body()).to_string();

        assert_eq!(res.status(), 200);
        assert!(body.contains("<h2>Diabetes</h2>"));
        assert!(body.contains("Positive votes: 1"));
        assert!(body.contains("negative votes: 1"));
        assert!(body.contains("models: 2"));
    }

    #[tokio::test]
    async fn test_unanimous_negative_vote() {
        let filter = routes(test_state(vec![
            negative_model("a"),
            negative_model("b"),
            negative_model("c"),
        ]));

        let res = warp::test::request()
            .method("POST")
            .path("/predict")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(VALID_FORM)
            .reply(&filter)
            .await;
        let body = String::from_utf8_lossy(res.body()).to_string();

        assert!(body.contains("<h2>No Diabetes</h2>"));
        assert!(body.contains("Positive votes: 0"));
    }

    #[tokio::test]
    async fn test_non_numeric_age_renders_a_validation_message() {
        let filter = routes(test_state(vec![positive_model("a")]));

        let res = warp::test::request()
            .method("POST")
            .path("/predict")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(VALID_FORM.replace("age=44", "age=forty"))
            .reply(&filter)
            .await;
        let body = String::from_utf8_lossy(res.body()).to_string();

        assert_eq!(res.status(), 200);
        assert!(body.contains("class=\"failure\""));
        assert!(body.contains("invalid age"));
        assert!(!body.contains("Positive votes"));
    }

    #[tokio::test]
    async fn test_missing_field_renders_a_validation_message() {
        let filter = routes(test_state(vec![positive_model("a")]));

        let res = warp::test::request()
            .method("POST")
            .path("/predict")
            .header("content-type", "application/x-www-form-urlencoded")
            .body("gender=female&age=44")
            .reply(&filter)
            .await;
        let body = String::from_utf8_lossy(res.body()).to_string();

        assert!(body.contains("class=\"failure\""));
        assert!(body.contains("missing field"));
    }

    #[tokio::test]
    async fn test_empty_ensemble_renders_a_configuration_message() {
        let filter = routes(test_state(vec![]));

        let res = warp::test::request()
            .method("POST")
            .path("/predict")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(VALID_FORM)
            .reply(&filter)
            .await;
        let body = String::from_utf8_lossy(res.body()).to_string();

        assert!(body.contains("class=\"failure\""));
        assert!(body.contains("no models loaded"));
    }

    #[tokio::test]
    async fn test_health_reports_model_count() {
        let filter = routes(test_state(vec![
            positive_model("a"),
            negative_model("b"),
        ]));

        let res = warp::test::request().path("/health").reply(&filter).await;
        let body = String::from_utf8_lossy(res.body()).to_string();

        assert_eq!(res.status(), 200);
        assert!(body.contains("\"models\":2"));
    }
}
