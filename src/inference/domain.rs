//! Domain definitions for single-record predictions.

use std::sync::Arc;

use crate::common::error::{ChurnError, ErrorCode};
use crate::common::ids::RunId;
use crate::training::domain::ChurnPipeline;

/// Tagged result of one prediction; the transport decides the status code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PredictOutcome {
    /// Predicted churn class, 0 or 1.
    Label(u8),
    /// The record could not be scored.
    Rejected { code: ErrorCode, reason: String },
}

impl From<ChurnError> for PredictOutcome {
    fn from(err: ChurnError) -> Self {
        PredictOutcome::Rejected {
            code: err.code(),
            reason: err.to_string(),
        }
    }
}

/// Service object holding the model loaded at start-up. Read-only after
/// construction; clones share the same pipeline.
#[derive(Clone, Debug)]
pub struct ChurnPredictor {
    pub(crate) run_id: RunId,
    pub(crate) pipeline: Arc<ChurnPipeline>,
}

impl ChurnPredictor {
    pub fn new(run_id: RunId, pipeline: ChurnPipeline) -> Self {
        Self {
            run_id,
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }
}
