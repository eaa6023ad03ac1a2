//! Prediction service: loads one run's pipeline, then serves `POST /predict`.
//! Refuses to start when the artefact cannot be loaded.

use std::process::ExitCode;

use churn::api::http;
use churn::common::config::AppCfg;
use churn::common::error::ChurnResult;
use churn::common::ids::RunId;
use churn::common::log;
use churn::inference::ChurnPredictor;
use churn::training::FsArtifactStore;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(ev = "serve.failed", code = err.code().as_u32(), error = %err);
            eprintln!("churn-serve: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ChurnResult<()> {
    let cfg = AppCfg::load()?;
    log::init(&cfg.log_filter, cfg.log_format)?;

    let store = FsArtifactStore::from_uri(&cfg.tracking_uri, &cfg.experiment)?;
    let run_id = RunId::parse(&cfg.run_id)?;
    let predictor = ChurnPredictor::load(&store, run_id)?;

    http::serve(&cfg.bind_addr(), predictor).await
}
