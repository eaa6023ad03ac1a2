//! Training domain: feature transform, model fitting and artefact storage.

pub mod domain;
pub mod repo_fs;
pub mod service;
pub mod transform;

pub use domain::{ArtifactStore, ChurnPipeline, RunManifest, TrainConfig};
pub use repo_fs::FsArtifactStore;
