//! Demo Bundle Seeder
//!
//! Writes a small demonstration model bundle so the service can run
//! without the real training pipeline's output.

use anyhow::Result;
use diabetes_screener::models::classifier::{
    DecisionTree, LogisticRegression, ModelKind, RandomForest, TreeNode,
};
use diabetes_screener::models::loader::ModelSpec;
use flate2::write::GzEncoder;
use flate2::Compression;
use indexmap::IndexMap;
use std::fs::File;
use std::io::Write;
use tracing::info;

fn smoking_levels() -> Vec<String> {
    ["never", "No Info", "current", "former", "ever", "not current"]
        .iter()
        .map(|level| level.to_string())
        .collect()
}

/// Stump splitting one feature: below-or-equal goes negative.
fn stump(feature: usize, threshold: f64) -> DecisionTree {
    DecisionTree {
        nodes: vec![
            TreeNode::Split {
                feature,
                threshold,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { label: 0 },
            TreeNode::Leaf { label: 1 },
        ],
    }
}

/// Three models with plausible coefficients over the patient schema:
/// gender, age, hypertension, heart_disease, smoking, bmi, HbA1c,
/// blood glucose.
fn demo_bundle() -> IndexMap<String, ModelSpec> {
    let mut bundle = IndexMap::new();

    bundle.insert(
        "logistic".to_string(),
        ModelSpec {
            smoking_levels: smoking_levels(),
            model: ModelKind::LogisticRegression(LogisticRegression {
                weights: vec![0.25, 0.035, 0.55, 0.45, 0.06, 0.07, 1.2, 0.02],
                intercept: -15.5,
            }),
        },
    );

    bundle.insert(
        "tree".to_string(),
        ModelSpec {
            smoking_levels: smoking_levels(),
            model: ModelKind::DecisionTree(DecisionTree {
                nodes: vec![
                    TreeNode::Split {
                        feature: 6, // HbA1c_level
                        threshold: 6.7,
                        left: 1,
                        right: 2,
                    },
                    TreeNode::Split {
                        feature: 7, // blood_glucose_level
                        threshold: 200.0,
                        left: 3,
                        right: 4,
                    },
                    TreeNode::Leaf { label: 1 },
                    TreeNode::Leaf { label: 0 },
                    TreeNode::Leaf { label: 1 },
                ],
            }),
        },
    );

    bundle.insert(
        "forest".to_string(),
        ModelSpec {
            smoking_levels: smoking_levels(),
            model: ModelKind::RandomForest(RandomForest {
                trees: vec![stump(6, 6.5), stump(6, 7.0), stump(7, 180.0)],
            }),
        },
    );

    bundle
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("seed_bundle=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let path = args
        .iter()
        .skip(1)
        .find(|arg| !arg.starts_with("--"))
        .map(|s| s.as_str())
        .unwrap_or("models/ensemble.json");
    let gzip = args.iter().any(|arg| arg == "--gzip");

    let bundle = demo_bundle();
    let json = serde_json::to_string_pretty(&bundle)?;

    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    if gzip {
        let gz_path = format!("{path}.gz");
        let file = File::create(&gz_path)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(json.as_bytes())?;
        encoder.finish()?;
        info!(path = %gz_path, models = bundle.len(), "Wrote compressed demo bundle");
    } else {
        std::fs::write(path, &json)?;
        info!(path = %path, models = bundle.len(), "Wrote demo bundle");
    }

    Ok(())
}
