//! Inference domain: a loaded pipeline scoring one customer record per call.

pub mod domain;
pub mod service;

pub use domain::{ChurnPredictor, PredictOutcome};
