use crate::model::model_utils::{
    check_format_version, default_format_version, read_artifact, ArtifactError, Features,
    Vectorizer,
};
use anyhow;
use async_trait::async_trait;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

/// Serialized form of a fitted bag-of-words vectorizer.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CountVectorizerConfig {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    pub vocabulary: HashMap<String, usize>,
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub binary: bool,
}

fn default_lowercase() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// Token counts over a fixed vocabulary. Terms outside the vocabulary are ignored.
#[derive(Debug)]
pub struct CountVectorizer {
    config: CountVectorizerConfig,
}

impl CountVectorizer {
    pub fn new(config: CountVectorizerConfig) -> Result<Self, ArtifactError> {
        check_format_version(config.format_version)?;

        let (min_n, max_n) = config.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ArtifactError::Invalid(format!(
                "bad ngram_range ({min_n}, {max_n})"
            )));
        }

        let dim = config.vocabulary.len();
        if dim == 0 {
            return Err(ArtifactError::Invalid("empty vocabulary".to_string()));
        }
        let mut seen = vec![false; dim];
        for (term, &idx) in &config.vocabulary {
            if idx >= dim || seen[idx] {
                return Err(ArtifactError::Invalid(format!(
                    "vocabulary index {idx} for {term:?} is out of range or duplicated"
                )));
            }
            seen[idx] = true;
        }

        Ok(Self { config })
    }

    pub fn from_file(path: &Path) -> Result<Self, ArtifactError> {
        Self::new(read_artifact(path)?)
    }

    pub fn dimensions(&self) -> usize {
        self.config.vocabulary.len()
    }

    /// Runs of two or more word characters, the usual bag-of-words token rule.
    fn tokenize(&self, text: &str) -> Vec<String> {
        let text = if self.config.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };
        text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|t| t.chars().count() >= 2)
            .map(|t| t.to_string())
            .collect()
    }

    fn count_terms(&self, text: &str) -> HashMap<usize, f32> {
        let tokens = self.tokenize(text);
        let (min_n, max_n) = self.config.ngram_range;
        let mut counts = HashMap::new();

        for n in min_n..=max_n {
            for window in tokens.windows(n) {
                let gram = window.join(" ");
                if let Some(&idx) = self.config.vocabulary.get(&gram) {
                    *counts.entry(idx).or_insert(0.0) += 1.0;
                }
            }
        }

        if self.config.binary {
            counts.values_mut().for_each(|c| *c = 1.0);
        }
        counts
    }
}

#[async_trait]
impl Vectorizer for CountVectorizer {
    async fn transform(&self, texts: Vec<&str>) -> anyhow::Result<Features> {
        let start = Instant::now();
        let rows: Vec<HashMap<usize, f32>> =
            texts.par_iter().map(|t| self.count_terms(t)).collect();

        let mut features = Features::zeros((texts.len(), self.dimensions()));
        for (i, row) in rows.into_iter().enumerate() {
            for (j, count) in row {
                features[[i, j]] = count;
            }
        }

        debug!("vectorizing {} text(s) took: {:?}", texts.len(), start.elapsed());
        Ok(features)
    }
}
