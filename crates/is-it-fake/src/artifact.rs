//! Persisting and loading the fitted pipeline.

use std::{fs, io::Write, path::Path};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::info;

use crate::{
    error::{DetectorError, Result},
    pipeline::TrainedPipeline,
};

/// Bump when the serialized layout of [`TrainedPipeline`] changes.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope<P> {
    format_version: u32,
    crate_version: String,
    pipeline: P,
}

fn bincode_config() -> bincode::config::Configuration {
    bincode::config::standard()
}

impl TrainedPipeline {
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::error::EncodeError> {
        let envelope = Envelope {
            format_version: ARTIFACT_FORMAT_VERSION,
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            pipeline: self,
        };
        bincode::serde::encode_to_vec(&envelope, bincode_config())
    }

    /// Decode an artifact produced by [`TrainedPipeline::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        let (envelope, _): (Envelope<Self>, usize) =
            bincode::serde::decode_from_slice(bytes, bincode_config())
                .map_err(|e| format!("undecodable artifact: {e}"))?;
        if envelope.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(format!(
                "artifact format version {} (written by {}) is not supported, expected {}",
                envelope.format_version, envelope.crate_version, ARTIFACT_FORMAT_VERSION
            ));
        }
        Ok(envelope.pipeline)
    }

    /// Atomically replace the artifact at `path`: a concurrent reader sees
    /// either the previous file or the complete new one.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self
            .to_bytes()
            .map_err(|e| DetectorError::artifact_write(path, e))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| DetectorError::artifact_write(path, e))?;

        let mut tmp =
            NamedTempFile::new_in(dir).map_err(|e| DetectorError::artifact_write(path, e))?;
        tmp.write_all(&bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| DetectorError::artifact_write(path, e))?;
        tmp.persist(path)
            .map_err(|e| DetectorError::artifact_write(path, e.error))?;

        info!(path = %path.display(), bytes = bytes.len(), "Pipeline artifact written");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| DetectorError::artifact_load(path, e))?;
        let pipeline = Self::from_bytes(&bytes).map_err(|e| DetectorError::artifact_load(path, e))?;
        info!(
            path = %path.display(),
            features = pipeline.num_features(),
            "Pipeline artifact loaded"
        );
        Ok(pipeline)
    }
}
