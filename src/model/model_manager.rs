use crate::labels::RawLabel;
use crate::model::backends::count_vectorizer::CountVectorizer;
use crate::model::backends::linear::LinearClassifier;
use crate::model::model_utils::{Classifier, Vectorizer};
use anyhow::Error;
use log::info;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Vectorizer and classifier pair, loaded once and shared read-only.
#[derive(Clone)]
pub struct ModelManager {
    vectorizer: Arc<dyn Vectorizer>,
    classifier: Arc<dyn Classifier>,
}

impl ModelManager {
    pub fn new(vectorizer: Arc<dyn Vectorizer>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            vectorizer,
            classifier,
        }
    }

    pub fn load(classifier_path: &Path, vectorizer_path: &Path) -> anyhow::Result<Self> {
        let start = Instant::now();
        let vectorizer = CountVectorizer::from_file(vectorizer_path)?;
        info!(
            "Loaded vectorizer from {:?} ({} terms)",
            vectorizer_path,
            vectorizer.dimensions()
        );

        let classifier = LinearClassifier::from_file(classifier_path)?;
        info!(
            "Loaded classifier from {:?} (classes: {:?})",
            classifier_path,
            classifier.classes()
        );

        if classifier.n_features() != vectorizer.dimensions() {
            return Err(Error::msg(format!(
                "classifier expects {} features but vectorizer produces {}",
                classifier.n_features(),
                vectorizer.dimensions()
            )));
        }

        info!("Models loaded in {:?}", start.elapsed());
        Ok(Self::new(Arc::new(vectorizer), Arc::new(classifier)))
    }

    pub async fn predict(&self, texts: Vec<&str>) -> anyhow::Result<Vec<RawLabel>> {
        let n_texts = texts.len();
        let features = self.vectorizer.transform(texts).await?;
        let labels = self.classifier.predict(&features).await?;
        if labels.len() != n_texts {
            return Err(Error::msg(format!(
                "classifier returned {} label(s) for {} text(s)",
                labels.len(),
                n_texts
            )));
        }
        Ok(labels)
    }

    pub async fn predict_one(&self, text: &str) -> anyhow::Result<RawLabel> {
        self.predict(vec![text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::msg("classifier returned no label"))
    }
}
