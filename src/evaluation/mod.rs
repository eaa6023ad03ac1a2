//! Held-out evaluation of fitted pipelines.

pub mod domain;
pub mod service;

pub use domain::{Confusion, EvalSuite};
