use std::path::PathBuf;

const DEFAULT_MODEL_DIR: &str = ".";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5001;
pub const CLASSIFIER_FILE: &str = "basic_classifier.json";
pub const VECTORIZER_FILE: &str = "count_vectorizer.json";
/// Request body cap for `/predict` and `/demo`.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Directory holding the model artifacts, `NEWSCLF_MODEL_DIR` or the working directory.
pub fn model_dir() -> PathBuf {
    std::env::var("NEWSCLF_MODEL_DIR")
        .unwrap_or_else(|_| DEFAULT_MODEL_DIR.to_string())
        .into()
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    pub classifier_path: PathBuf,
    pub vectorizer_path: PathBuf,
    pub expose_error_detail: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        let dir = model_dir();
        ServeConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            classifier_path: dir.join(CLASSIFIER_FILE),
            vectorizer_path: dir.join(VECTORIZER_FILE),
            expose_error_detail: true,
        }
    }
}

impl ServeConfig {
    /// Explicit artifact paths win over the model directory.
    pub fn with_artifacts(
        mut self,
        model_dir: Option<PathBuf>,
        classifier: Option<PathBuf>,
        vectorizer: Option<PathBuf>,
    ) -> Self {
        if let Some(dir) = model_dir {
            self.classifier_path = dir.join(CLASSIFIER_FILE);
            self.vectorizer_path = dir.join(VECTORIZER_FILE);
        }
        if let Some(path) = classifier {
            self.classifier_path = path;
        }
        if let Some(path) = vectorizer {
            self.vectorizer_path = path;
        }
        self
    }
}
