//! Service layer composing ingestion, fitting, evaluation and artefact logging.
//!
//! The run is a fixed sequence driven by [`run`]:
//! `read_data -> preprocess -> split_data -> fit_pipeline -> evaluate -> log_model`.

use std::path::Path;
use std::time::Instant;

use linfa::prelude::*;
use linfa_logistic::LogisticRegression;
use ndarray::Array1;

use crate::common::error::{ChurnError, ChurnResult};
use crate::common::ids::RunId;
use crate::common::time;
use crate::data::domain::{Split, Table};
use crate::data::service as data_service;
use crate::evaluation::service as eval_service;

use super::domain::{ArtifactStore, ChurnPipeline, RunManifest, TrainConfig};
use super::transform::ColumnTransformer;

/// Outcome of one end-to-end training run.
#[derive(Debug)]
pub struct TrainedRun {
    pub run_id: RunId,
    pub manifest: RunManifest,
    pub pipeline: ChurnPipeline,
    pub split: Split,
}

/// Fit the column transform and the logistic regression on the training partition.
pub fn fit_pipeline(
    x_train: &Table,
    y_train: &Array1<usize>,
    cfg: &TrainConfig,
) -> ChurnResult<ChurnPipeline> {
    let start = Instant::now();
    let transform =
        ColumnTransformer::fit(x_train, &cfg.numeric_features, &cfg.categorical_features)?;
    let x = transform.transform(x_train)?;

    let dataset = Dataset::new(x, y_train.clone());
    let classifier = LogisticRegression::default()
        .alpha(cfg.alpha)
        .with_intercept(true)
        .max_iterations(cfg.max_iterations)
        .gradient_tolerance(cfg.gradient_tolerance)
        .fit(&dataset)
        .map_err(|err| ChurnError::Fit(err.to_string()))?;

    tracing::info!(
        ev = "train.fit",
        rows = x_train.n_rows(),
        features = transform.n_features(),
        dur_ms = time::elapsed_ms(start),
    );
    Ok(ChurnPipeline {
        transform,
        classifier,
    })
}

/// Run the whole training pipeline over `data_path` and log the result.
pub fn run(
    cfg: &TrainConfig,
    data_path: &Path,
    experiment: &str,
    store: &dyn ArtifactStore,
) -> ChurnResult<TrainedRun> {
    let run_id = RunId::generate();
    let span = tracing::info_span!("train", run_id = %run_id);
    let _guard = span.enter();

    let (raw, dataset) = data_service::read_data(data_path, &cfg.lenient_column)?;
    let table = data_service::preprocess(&raw, &cfg.id_column)?;
    let split = data_service::split_data(&table, &cfg.target_column, cfg.test_size, cfg.seed)?;
    tracing::info!(
        ev = "data.split",
        train_rows = split.train_rows.len(),
        test_rows = split.test_rows.len(),
    );

    let pipeline = fit_pipeline(&split.x_train, &split.y_train, cfg)?;
    let metrics = eval_service::evaluate(&pipeline, &split.x_test, split.y_test.view())?;

    let manifest = RunManifest {
        run_id: run_id.clone(),
        experiment: experiment.to_string(),
        created_ms: time::now_ms(),
        dataset,
        config: cfg.clone(),
        train_rows: split.train_rows.len(),
        test_rows: split.test_rows.len(),
        feature_names: pipeline.transform.feature_names(),
        metrics,
    };
    store.log_model(&manifest, &pipeline)?;

    Ok(TrainedRun {
        run_id,
        manifest,
        pipeline,
        split,
    })
}
