//! Model bundle loader.
//!
//! The bundle is a JSON document produced by the training pipeline:
//! either a map of model name to model spec (insertion order preserved),
//! or a bare single spec loaded under the name "model". A gzip
//! compressed sibling (`<path>.gz`) is read transparently when the plain
//! file is absent.

use crate::error::{ScreenError, ScreenResult};
use crate::models::classifier::{BinaryClassifier, CategoryEncoder, ModelError, ModelKind};
use crate::types::patient::FeatureRow;
use flate2::read::GzDecoder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

/// A named model ready for voting
#[derive(Debug)]
pub struct LoadedModel {
    /// Bundle key, or "model" for a singleton bundle
    pub name: String,
    /// Encoder for the smoking_history slot, from this model's training
    pub encoder: CategoryEncoder,
    /// The predictor itself
    pub model: ModelKind,
}

impl LoadedModel {
    /// Encode a feature row into the numeric vector this model scores,
    /// in fixed schema order.
    pub fn feature_vector(&self, row: &FeatureRow) -> Result<Vec<f64>, ModelError> {
        let smoking = self
            .encoder
            .encode(&row.smoking_history)
            .ok_or_else(|| ModelError::UnknownCategory(row.smoking_history.clone()))?;

        Ok(vec![
            row.gender as f64,
            row.age,
            row.hypertension as f64,
            row.heart_disease as f64,
            smoking,
            row.bmi,
            row.hba1c_level,
            row.blood_glucose_level,
        ])
    }
}

/// One bundle entry as serialized by the training side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    /// smoking_history categories seen in training, in training order
    #[serde(default = "default_smoking_levels")]
    pub smoking_levels: Vec<String>,

    #[serde(flatten)]
    pub model: ModelKind,
}

fn default_smoking_levels() -> Vec<String> {
    ["never", "No Info", "current", "former", "ever", "not current"]
        .iter()
        .map(|level| level.to_string())
        .collect()
}

/// Bundle document: a named collection, or a single anonymous model
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BundleFile {
    Collection(IndexMap<String, ModelSpec>),
    Single(ModelSpec),
}

/// Loader for serialized model bundles
pub struct ModelLoader;

impl ModelLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load the bundle at `path`, falling back to `<path>.gz`.
    ///
    /// Fails with `Startup` when neither file exists or the document
    /// does not parse; the process must not serve without models.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> ScreenResult<Vec<LoadedModel>> {
        let path = path.as_ref();
        let raw = self.read_bundle(path)?;

        let bundle: BundleFile = serde_json::from_slice(&raw).map_err(|e| {
            ScreenError::Startup(format!(
                "failed to parse model bundle {}: {e}",
                path.display()
            ))
        })?;

        let entries: Vec<(String, ModelSpec)> = match bundle {
            BundleFile::Collection(map) => map.into_iter().collect(),
            BundleFile::Single(spec) => vec![("model".to_string(), spec)],
        };

        let models: Vec<LoadedModel> = entries
            .into_iter()
            .map(|(name, spec)| LoadedModel {
                name,
                encoder: CategoryEncoder::new(spec.smoking_levels),
                model: spec.model,
            })
            .collect();

        for model in &models {
            info!(model = %model.name, kind = model.model.kind(), "Model loaded");
        }
        info!(count = models.len(), path = %path.display(), "Model bundle loaded");

        Ok(models)
    }

    fn read_bundle(&self, path: &Path) -> ScreenResult<Vec<u8>> {
        if path.exists() {
            return std::fs::read(path).map_err(|e| {
                ScreenError::Startup(format!("failed to read {}: {e}", path.display()))
            });
        }

        let gz_path = gz_sibling(path);
        if gz_path.exists() {
            let file = File::open(&gz_path).map_err(|e| {
                ScreenError::Startup(format!("failed to open {}: {e}", gz_path.display()))
            })?;
            let mut raw = Vec::new();
            GzDecoder::new(file).read_to_end(&mut raw).map_err(|e| {
                ScreenError::Startup(format!("failed to decompress {}: {e}", gz_path.display()))
            })?;
            info!(path = %gz_path.display(), "Reading compressed model bundle");
            return Ok(raw);
        }

        Err(ScreenError::Startup(format!(
            "model bundle not found: {} (also tried {})",
            path.display(),
            gz_path.display()
        )))
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn gz_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const BUNDLE: &str = r#"{
        "logreg": {
            "kind": "logistic_regression",
            "weights": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            "intercept": 2.0,
            "smoking_levels": ["never", "current"]
        },
        "tree": {
            "kind": "decision_tree",
            "nodes": [{"op": "leaf", "label": 0}]
        }
    }"#;

    fn sample_row() -> FeatureRow {
        FeatureRow {
            gender: 1,
            age: 50.0,
            hypertension: 0,
            heart_disease: 0,
            smoking_history: "never".to_string(),
            bmi: 25.0,
            hba1c_level: 6.0,
            blood_glucose_level: 140.0,
        }
    }

    #[test]
    fn test_load_plain_bundle_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        std::fs::write(&path, BUNDLE).unwrap();

        let models = ModelLoader::new().load(&path).unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].name, "logreg");
        assert_eq!(models[1].name, "tree");
        assert_eq!(models[0].model.kind(), "logistic_regression");
    }

    #[test]
    fn test_load_falls_back_to_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        let gz_path = dir.path().join("bundle.json.gz");

        let file = File::create(&gz_path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(BUNDLE.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let models = ModelLoader::new().load(&path).unwrap();
        assert_eq!(models.len(), 2);
    }

    #[test]
    fn test_missing_bundle_is_a_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelLoader::new()
            .load(dir.path().join("nowhere.json"))
            .unwrap_err();
        assert!(matches!(err, ScreenError::Startup(_)));
        assert!(err.to_string().contains("nowhere.json.gz"));
    }

    #[test]
    fn test_unparseable_bundle_is_a_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        std::fs::write(&path, "not json").unwrap();

        let err = ModelLoader::new().load(&path).unwrap_err();
        assert!(matches!(err, ScreenError::Startup(_)));
    }

    #[test]
    fn test_single_model_bundle_loads_anonymously() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        std::fs::write(
            &path,
            r#"{"kind": "decision_tree", "nodes": [{"op": "leaf", "label": 1}]}"#,
        )
        .unwrap();

        let models = ModelLoader::new().load(&path).unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "model");
    }

    #[test]
    fn test_feature_vector_uses_the_model_encoder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        std::fs::write(&path, BUNDLE).unwrap();

        let models = ModelLoader::new().load(&path).unwrap();

        let features = models[0].feature_vector(&sample_row()).unwrap();
        assert_eq!(features.len(), 8);
        assert_eq!(features[0], 1.0); // gender
        assert_eq!(features[4], 0.0); // "never" is level 0 for logreg

        let mut unseen = sample_row();
        unseen.smoking_history = "vaping".to_string();
        assert!(matches!(
            models[0].feature_vector(&unseen).unwrap_err(),
            ModelError::UnknownCategory(_)
        ));
    }
}
