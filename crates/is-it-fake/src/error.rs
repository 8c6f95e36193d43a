use std::path::PathBuf;

use is_it_fake_preprocessing::VectorizerError;
use thiserror::Error;

pub type Result<T, E = DetectorError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DetectorError {
    /// A scoring request is missing one of the five posting fields.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("failed to load pipeline artifact from {path}: {reason}")]
    ArtifactLoad { path: PathBuf, reason: String },

    #[error("failed to write pipeline artifact to {path}: {reason}")]
    ArtifactWrite { path: PathBuf, reason: String },

    #[error("invalid training data: {0}")]
    TrainingDataInvalid(String),

    #[error("dataset error: {0}")]
    Dataset(#[from] csv::Error),

    #[error(transparent)]
    Vectorizer(#[from] VectorizerError),
}

impl DetectorError {
    pub(crate) fn artifact_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArtifactLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn artifact_write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ArtifactWrite {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
