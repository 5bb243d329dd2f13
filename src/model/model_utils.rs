use crate::labels::RawLabel;
use anyhow;
use async_trait::async_trait;
use ndarray::Array2;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Artifact layout version understood by the loaders.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// One row per input text.
pub type Features = Array2<f32>;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to open artifact {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse artifact {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("unsupported artifact format version {found}, expected {expected}")]
    Version { found: u32, expected: u32 },
    #[error("invalid artifact: {0}")]
    Invalid(String),
}

#[async_trait]
pub trait Vectorizer: Send + Sync {
    async fn transform(&self, texts: Vec<&str>) -> anyhow::Result<Features>;
}

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Returns one label per feature row.
    async fn predict(&self, features: &Features) -> anyhow::Result<Vec<RawLabel>>;
}

pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn check_format_version(found: u32) -> Result<(), ArtifactError> {
    if found != ARTIFACT_FORMAT_VERSION {
        return Err(ArtifactError::Version {
            found,
            expected: ARTIFACT_FORMAT_VERSION,
        });
    }
    Ok(())
}

pub(crate) fn default_format_version() -> u32 {
    ARTIFACT_FORMAT_VERSION
}
