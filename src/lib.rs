//! Customer churn: a training pipeline for a logistic-regression classifier
//! over tabular account data, and the inference service that serves it.
pub mod api;
pub mod common;
pub mod data;
pub mod evaluation;
pub mod inference;
pub mod training;

pub use common::{ChurnError, ChurnResult};
pub use inference::{ChurnPredictor, PredictOutcome};
