use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Label returned by the public API. Documented as 0/1, see [`numeric_fallback`].
pub type CanonicalLabel = i64;

const POSITIVE_LABELS: [&str; 6] = ["fake", "1", "true", "yes", "positive", "pos"];
const NEGATIVE_LABELS: [&str; 6] = ["real", "0", "false", "no", "negative", "neg"];

/// Unprocessed classifier output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawLabel {
    Text(String),
    Integer(i64),
    Boolean(bool),
}

impl RawLabel {
    pub fn to_text(&self) -> String {
        match self {
            RawLabel::Text(s) => s.clone(),
            RawLabel::Integer(n) => n.to_string(),
            RawLabel::Boolean(b) => b.to_string(),
        }
    }
}

impl fmt::Display for RawLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for RawLabel {
    fn from(value: &str) -> Self {
        RawLabel::Text(value.to_string())
    }
}

impl From<String> for RawLabel {
    fn from(value: String) -> Self {
        RawLabel::Text(value)
    }
}

impl From<i64> for RawLabel {
    fn from(value: i64) -> Self {
        RawLabel::Integer(value)
    }
}

impl From<bool> for RawLabel {
    fn from(value: bool) -> Self {
        RawLabel::Boolean(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized prediction label from model: {raw:?}")]
pub struct UnrecognizedLabel {
    pub raw: RawLabel,
}

/// Maps a raw classifier label to the API's canonical integer.
///
/// Known spellings are matched case-insensitively after trimming. Anything
/// else goes through [`numeric_fallback`] before being rejected.
pub fn normalize(raw: &RawLabel) -> Result<CanonicalLabel, UnrecognizedLabel> {
    let text = raw.to_text();
    let key = text.trim().to_lowercase();

    if POSITIVE_LABELS.contains(&key.as_str()) {
        return Ok(1);
    }
    if NEGATIVE_LABELS.contains(&key.as_str()) {
        return Ok(0);
    }

    numeric_fallback(&key).ok_or_else(|| UnrecognizedLabel { raw: raw.clone() })
}

/// Integer pass-through for labels outside the vocabulary.
///
/// The parsed value is returned as-is and is NOT clamped to {0, 1}: a model
/// emitting `"42"` yields a prediction of 42. Callers may depend on this.
pub fn numeric_fallback(text: &str) -> Option<CanonicalLabel> {
    text.trim().parse::<i64>().ok()
}
