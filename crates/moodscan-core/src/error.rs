//! Error taxonomy for the analysis pipeline

use moodscan_proto::INVALID_JSON_MESSAGE;
use thiserror::Error;

/// Errors raised while loading resources or analysing a request
#[derive(Error, Debug)]
pub enum MoodError {
    #[error("{}", INVALID_JSON_MESSAGE)]
    InvalidJsonInput,

    #[error("invalid audio input: {0}")]
    InvalidAudioInput(String),

    #[error("feature shape mismatch: expected {expected} features, got {actual}")]
    FeatureShapeMismatch { expected: usize, actual: usize },

    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("Processing failed: {0}")]
    ProcessingFailed(String),

    #[error("Unsupported request format: expected a filePath field")]
    UnsupportedRequestFormat,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MoodError {
    /// Wrap any per-request failure into the single message shape the host sees
    pub fn into_processing_failed(self) -> MoodError {
        match self {
            MoodError::ProcessingFailed(_) => self,
            other => MoodError::ProcessingFailed(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, MoodError>;
