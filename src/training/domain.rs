//! Domain types for model training and versioning.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use linfa::prelude::*;
use linfa_logistic::FittedLogisticRegression;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::common::error::{ChurnError, ChurnResult};
use crate::common::ids::RunId;
use crate::data::domain::{
    DatasetInfo, Table, CATEGORICAL_FEATURES, ID_COLUMN, LENIENT_COLUMN, NUMERIC_FEATURES,
    TARGET_COLUMN,
};
use crate::evaluation::domain::EvalSuite;

use super::transform::ColumnTransformer;

/// Training parameters. Every field has a default, so a TOML file only needs
/// the keys it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub id_column: String,
    pub target_column: String,
    pub lenient_column: String,
    pub numeric_features: Vec<String>,
    pub categorical_features: Vec<String>,
    pub test_size: f64,
    pub seed: u64,
    pub max_iterations: u64,
    /// L2 penalty strength.
    pub alpha: f64,
    pub gradient_tolerance: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            id_column: ID_COLUMN.to_string(),
            target_column: TARGET_COLUMN.to_string(),
            lenient_column: LENIENT_COLUMN.to_string(),
            numeric_features: NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect(),
            categorical_features: CATEGORICAL_FEATURES.iter().map(|s| s.to_string()).collect(),
            test_size: 0.25,
            seed: 42,
            max_iterations: 500,
            alpha: 1.0,
            gradient_tolerance: 1e-4,
        }
    }
}

impl TrainConfig {
    pub fn from_toml_str(raw: &str) -> ChurnResult<Self> {
        toml::from_str(raw).map_err(|err| ChurnError::Config(format!("training config: {err}")))
    }

    pub fn load(path: &Path) -> ChurnResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ChurnError::io(path, source))?;
        Self::from_toml_str(&raw)
    }
}

/// Fitted transform plus classifier, reused unchanged at inference time.
#[derive(Serialize, Deserialize)]
pub struct ChurnPipeline {
    pub transform: ColumnTransformer,
    pub classifier: FittedLogisticRegression<f64, usize>,
}

impl ChurnPipeline {
    /// Class labels (0/1) for every row of `table`.
    pub fn predict(&self, table: &Table) -> ChurnResult<Array1<usize>> {
        let x = self.transform.transform(table)?;
        Ok(self.classifier.predict(&x))
    }

    /// Intercept on the log-odds of churn (class 1).
    pub fn intercept(&self) -> f64 {
        self.churn_sign() * self.classifier.intercept()
    }

    /// Coefficients on the log-odds of churn (class 1), in
    /// [`ColumnTransformer::feature_names`] order.
    pub fn coefficients(&self) -> Array1<f64> {
        self.classifier.params() * self.churn_sign()
    }

    // the classifier's positive class is whichever label was more frequent
    fn churn_sign(&self) -> f64 {
        if self.classifier.labels().pos.class == 1 {
            1.0
        } else {
            -1.0
        }
    }
}

impl fmt::Debug for ChurnPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChurnPipeline")
            .field("features", &self.transform.n_features())
            .field("intercept", &self.intercept())
            .finish()
    }
}

/// Everything recorded about one training run next to its artefact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub experiment: String,
    pub created_ms: u64,
    pub dataset: DatasetInfo,
    pub config: TrainConfig,
    pub train_rows: usize,
    pub test_rows: usize,
    pub feature_names: Vec<String>,
    pub metrics: EvalSuite,
}

/// Storage contract for model artefacts, standing in for an experiment tracker.
pub trait ArtifactStore {
    /// Persist the pipeline and its manifest, returning the model directory.
    fn log_model(&self, manifest: &RunManifest, pipeline: &ChurnPipeline) -> ChurnResult<PathBuf>;
    fn load_model(&self, run_id: &RunId) -> ChurnResult<ChurnPipeline>;
    fn load_manifest(&self, run_id: &RunId) -> ChurnResult<RunManifest>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_run() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.numeric_features.len(), 3);
        assert_eq!(cfg.categorical_features.len(), 16);
        assert_eq!(cfg.test_size, 0.25);
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.max_iterations, 500);
    }

    #[test]
    fn toml_overrides_only_named_keys() {
        let cfg = TrainConfig::from_toml_str("seed = 7\ntest_size = 0.2\n").unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.test_size, 0.2);
        assert_eq!(cfg.target_column, "Churn");
        assert!(matches!(
            TrainConfig::from_toml_str("seed = \"x\""),
            Err(ChurnError::Config(_))
        ));
    }
}
