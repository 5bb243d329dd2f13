use crate::labels::RawLabel;
use crate::model::model_utils::{
    check_format_version, default_format_version, read_artifact, ArtifactError, Classifier,
    Features,
};
use anyhow;
use async_trait::async_trait;
use log::debug;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

/// Serialized form of a fitted linear model.
///
/// Two classes use a single coefficient row whose positive side picks
/// `classes[1]`. More classes use one row per class and the highest score wins.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LinearClassifierConfig {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    pub classes: Vec<RawLabel>,
    pub coef: Vec<Vec<f32>>,
    pub intercept: Vec<f32>,
}

#[derive(Debug)]
pub struct LinearClassifier {
    classes: Vec<RawLabel>,
    coef: Array2<f32>,
    intercept: Array1<f32>,
}

impl LinearClassifier {
    pub fn new(config: LinearClassifierConfig) -> Result<Self, ArtifactError> {
        check_format_version(config.format_version)?;

        let n_classes = config.classes.len();
        if n_classes < 2 {
            return Err(ArtifactError::Invalid(format!(
                "expected at least 2 classes, got {n_classes}"
            )));
        }
        let expected_rows = if n_classes == 2 { 1 } else { n_classes };
        if config.coef.len() != expected_rows || config.intercept.len() != expected_rows {
            return Err(ArtifactError::Invalid(format!(
                "{n_classes} classes need {expected_rows} coefficient row(s) and intercept(s), got {} and {}",
                config.coef.len(),
                config.intercept.len()
            )));
        }

        let n_features = config.coef[0].len();
        if n_features == 0 || config.coef.iter().any(|row| row.len() != n_features) {
            return Err(ArtifactError::Invalid(
                "coefficient rows must be non-empty and of equal length".to_string(),
            ));
        }

        let flat: Vec<f32> = config.coef.into_iter().flatten().collect();
        let coef = Array2::from_shape_vec((expected_rows, n_features), flat)
            .map_err(|e| ArtifactError::Invalid(e.to_string()))?;

        Ok(Self {
            classes: config.classes,
            coef,
            intercept: Array1::from(config.intercept),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        Self::new(read_artifact(path)?)
    }

    pub fn n_features(&self) -> usize {
        self.coef.ncols()
    }

    pub fn classes(&self) -> &[RawLabel] {
        &self.classes
    }

    pub fn decision_function(&self, features: &Features) -> anyhow::Result<Array2<f32>> {
        if features.ncols() != self.n_features() {
            anyhow::bail!(
                "feature dimension mismatch: classifier expects {}, got {}",
                self.n_features(),
                features.ncols()
            );
        }
        Ok(features.dot(&self.coef.t()) + &self.intercept)
    }
}

#[async_trait]
impl Classifier for LinearClassifier {
    async fn predict(&self, features: &Features) -> anyhow::Result<Vec<RawLabel>> {
        let start = Instant::now();
        let scores = self.decision_function(features)?;

        let labels = scores
            .axis_iter(Axis(0))
            .map(|row| {
                let idx = if row.len() == 1 {
                    usize::from(row[0] > 0.0)
                } else {
                    row.iter()
                        .enumerate()
                        .fold((0, f32::NEG_INFINITY), |best, (i, &s)| {
                            if s > best.1 {
                                (i, s)
                            } else {
                                best
                            }
                        })
                        .0
                };
                self.classes[idx].clone()
            })
            .collect();

        debug!("classifying {} row(s) took: {:?}", features.nrows(), start.elapsed());
        Ok(labels)
    }
}
