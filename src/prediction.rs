use crate::labels::{normalize, CanonicalLabel, RawLabel, UnrecognizedLabel};
use crate::model::model_manager::ModelManager;
use log::debug;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;

pub const NO_TEXT_PROVIDED: &str = "No text provided";

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("No text provided")]
    Validation,
    #[error(transparent)]
    UnrecognizedLabel(#[from] UnrecognizedLabel),
    #[error("{0:#}")]
    Internal(anyhow::Error),
}

impl PredictError {
    /// The `error` field shown to callers.
    pub fn public_message(&self) -> &'static str {
        match self {
            PredictError::Validation => NO_TEXT_PROVIDED,
            PredictError::UnrecognizedLabel(_) => "unrecognized model label",
            PredictError::Internal(_) => "internal error",
        }
    }

    /// Diagnostic text; validation failures have none.
    pub fn detail(&self) -> Option<String> {
        match self {
            PredictError::Validation => None,
            _ => Some(self.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Prediction {
    pub prediction: CanonicalLabel,
    #[serde(skip)]
    pub raw: RawLabel,
}

/// Pulls `text` out of a JSON body. Anything unusable reads as empty text.
pub fn extract_text(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| v.get("text").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_default()
}

/// Process-wide state handed to every request handler.
pub struct AppState {
    pub models: ModelManager,
    pub expose_error_detail: bool,
}

impl AppState {
    pub fn new(models: ModelManager) -> Self {
        Self {
            models,
            expose_error_detail: true,
        }
    }

    pub fn with_error_detail(mut self, expose: bool) -> Self {
        self.expose_error_detail = expose;
        self
    }

    pub async fn handle_predict(&self, text: &str) -> Result<Prediction, PredictError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PredictError::Validation);
        }

        let start = Instant::now();
        let raw = self
            .models
            .predict_one(text)
            .await
            .map_err(PredictError::Internal)?;
        let prediction = normalize(&raw)?;
        debug!("predicted {prediction} (raw {raw:?}) in {:?}", start.elapsed());

        Ok(Prediction { prediction, raw })
    }
}
