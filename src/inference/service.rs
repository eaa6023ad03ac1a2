//! Inference orchestration: load once, then score one record per call.

use std::time::Instant;

use crate::common::error::{ChurnError, ChurnResult};
use crate::common::ids::RunId;
use crate::common::time;
use crate::data::service as data_service;
use crate::training::domain::ArtifactStore;

use super::domain::{ChurnPredictor, PredictOutcome};

impl ChurnPredictor {
    /// Load the artefact for `run_id`. Failure here must stop start-up.
    pub fn load(store: &dyn ArtifactStore, run_id: RunId) -> ChurnResult<Self> {
        let start = Instant::now();
        let pipeline = store.load_model(&run_id)?;
        tracing::info!(
            ev = "model.loaded",
            run_id = %run_id,
            features = pipeline.transform.n_features(),
            dur_ms = time::elapsed_ms(start),
        );
        Ok(Self::new(run_id, pipeline))
    }

    /// Score one JSON customer record.
    pub fn predict(&self, body: &serde_json::Value) -> PredictOutcome {
        match self.try_predict(body) {
            Ok(label) => PredictOutcome::Label(label),
            Err(err) => {
                tracing::warn!(ev = "predict.rejected", code = err.code().as_u32(), error = %err);
                err.into()
            }
        }
    }

    fn try_predict(&self, body: &serde_json::Value) -> ChurnResult<u8> {
        let declared = self.pipeline.transform.input_columns();
        let row = data_service::record_to_table(body, &declared)?;
        let labels = self.pipeline.predict(&row)?;
        let label = labels
            .get(0)
            .copied()
            .ok_or_else(|| ChurnError::Fit("pipeline returned no prediction".into()))?;
        u8::try_from(label).map_err(|_| ChurnError::Fit(format!("label {label} out of range")))
    }
}
