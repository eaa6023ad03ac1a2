//! Filesystem artefact store laid out like a local tracking server:
//! `<root>/<experiment>/<run_id>/artifacts/model/model.json` plus a
//! `manifest.json` per run.

use std::fs::{self, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::common::error::{ChurnError, ChurnResult};
use crate::common::ids::RunId;

use super::domain::{ArtifactStore, ChurnPipeline, RunManifest};

const MODEL_FILE: &str = "model.json";
const MANIFEST_FILE: &str = "manifest.json";

/// Resolve a tracking URI to a local directory. Only `file://` URIs and bare
/// paths are reachable.
pub fn resolve_tracking_uri(uri: &str) -> ChurnResult<PathBuf> {
    match uri.split_once("://") {
        Some(("file", rest)) => Ok(PathBuf::from(rest)),
        Some((scheme, _)) => Err(ChurnError::UnsupportedScheme(scheme.to_string())),
        None => Ok(PathBuf::from(uri)),
    }
}

/// Persist model artefacts on the local filesystem.
pub struct FsArtifactStore {
    root: PathBuf,
    experiment: String,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>, experiment: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            experiment: experiment.into(),
        }
    }

    pub fn from_uri(uri: &str, experiment: &str) -> ChurnResult<Self> {
        Ok(Self::new(resolve_tracking_uri(uri)?, experiment))
    }

    pub fn run_dir(&self, run_id: &RunId) -> PathBuf {
        self.root.join(&self.experiment).join(run_id.as_str())
    }

    pub fn model_dir(&self, run_id: &RunId) -> PathBuf {
        self.run_dir(run_id).join("artifacts").join("model")
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> ChurnResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|source| ChurnError::io(path, source))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush().map_err(|source| ChurnError::io(path, source))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> ChurnResult<T> {
    let file = fs::File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ChurnError::ModelMissing(path.to_path_buf()),
        _ => ChurnError::io(path, source),
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

impl ArtifactStore for FsArtifactStore {
    fn log_model(&self, manifest: &RunManifest, pipeline: &ChurnPipeline) -> ChurnResult<PathBuf> {
        let model_dir = self.model_dir(&manifest.run_id);
        fs::create_dir_all(&model_dir).map_err(|source| ChurnError::io(&model_dir, source))?;

        write_json(&model_dir.join(MODEL_FILE), pipeline)?;
        write_json(&self.run_dir(&manifest.run_id).join(MANIFEST_FILE), manifest)?;

        tracing::info!(
            ev = "artifact.logged",
            run_id = %manifest.run_id,
            path = %model_dir.display(),
        );
        Ok(model_dir)
    }

    fn load_model(&self, run_id: &RunId) -> ChurnResult<ChurnPipeline> {
        read_json(&self.model_dir(run_id).join(MODEL_FILE))
    }

    fn load_manifest(&self, run_id: &RunId) -> ChurnResult<RunManifest> {
        read_json(&self.run_dir(run_id).join(MANIFEST_FILE))
    }
}
