//! Moodscan Core - Music Emotion Recognition
//!
//! Turns a short mono audio segment plus its tempo and key into valence and
//! arousal scores with a pretrained regression model, then into a discrete
//! mood label.

pub mod classify;
pub mod config;
pub mod error;
pub mod features;
pub mod key;
pub mod model;
pub mod pipeline;
pub mod scaler;
pub mod transform;
pub mod worker_config;

pub use classify::classify_emotion;
pub use config::AnalysisConfig;
pub use error::{MoodError, Result};
pub use features::{FeatureExtractor, FeatureVector};
pub use key::encode_key_label;
pub use model::{load_model, EmotionModel, Prediction};
pub use pipeline::EmotionPipeline;
pub use scaler::{FeatureScaler, ScaledFeatures};
pub use worker_config::WorkerConfig;

pub use moodscan_proto::{AnalysisRequest, Emotion, EmotionReport, Response};
