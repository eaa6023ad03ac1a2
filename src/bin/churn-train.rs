//! Offline training run: fits the churn pipeline and prints the new run id.

use std::process::ExitCode;

use churn::common::config::AppCfg;
use churn::common::error::ChurnResult;
use churn::common::log;
use churn::training::service;
use churn::training::{FsArtifactStore, TrainConfig};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(ev = "train.failed", code = err.code().as_u32(), error = %err);
            eprintln!("churn-train: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> ChurnResult<()> {
    let cfg = AppCfg::load()?;
    log::init(&cfg.log_filter, cfg.log_format)?;

    let train_cfg = match &cfg.train_config {
        Some(path) => TrainConfig::load(path)?,
        None => TrainConfig::default(),
    };
    let store = FsArtifactStore::from_uri(&cfg.tracking_uri, &cfg.experiment)?;

    let trained = service::run(&train_cfg, &cfg.data_file, &cfg.experiment, &store)?;
    tracing::info!(
        ev = "train.done",
        run_id = %trained.run_id,
        accuracy = trained.manifest.metrics.accuracy,
        f1 = trained.manifest.metrics.f1,
    );
    println!("{}", trained.run_id);
    Ok(())
}
