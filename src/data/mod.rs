//! Data domain: CSV ingest, cleaning, splitting and request conversion.

pub mod domain;
pub mod repo_fs;
pub mod service;

pub use domain::{DatasetInfo, Split, Table, Value};
