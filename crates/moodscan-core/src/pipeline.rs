//! Per-request processing: extract -> scale -> predict -> classify
//!
//! [`EmotionPipeline::process`] is the error boundary: whatever fails inside
//! it becomes a `{"error": "Processing failed: ..."}` response and nothing
//! escapes to the caller.

use crate::classify::classify_emotion;
use crate::config::AnalysisConfig;
use crate::error::{MoodError, Result};
use crate::features::{FeatureExtractor, FeatureVector};
use crate::key::encode_key_label;
use crate::model::{load_model, EmotionModel};
use crate::scaler::FeatureScaler;
use crate::worker_config::WorkerConfig;
use moodscan_proto::{AnalysisRequest, EmotionReport, RawPayload, Response};
use std::path::Path;
use std::sync::Arc;

/// Process-wide analysis state, built once at startup and read-only afterwards
pub struct EmotionPipeline {
    extractor: FeatureExtractor,
    scaler: Arc<FeatureScaler>,
    model: Arc<dyn EmotionModel>,
}

impl EmotionPipeline {
    /// Assemble a pipeline, checking that the artifacts agree on the feature width
    pub fn new(
        config: &AnalysisConfig,
        scaler: Arc<FeatureScaler>,
        model: Arc<dyn EmotionModel>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| MoodError::Config(e.to_string()))?;

        let extractor = FeatureExtractor::new(config);
        let width = extractor.feature_len();

        if scaler.dim() != width {
            return Err(MoodError::ModelLoad(format!(
                "scaler was fitted on {} features, extractor produces {}",
                scaler.dim(),
                width
            )));
        }
        if model.input_dim() != width {
            return Err(MoodError::ModelLoad(format!(
                "model expects {} features, extractor produces {}",
                model.input_dim(),
                width
            )));
        }

        Ok(Self {
            extractor,
            scaler,
            model,
        })
    }

    /// Load the scaler and model named by `config`
    pub fn from_config(config: &WorkerConfig, install_dir: &Path) -> Result<Self> {
        let scaler_path = config.scaler_path(install_dir);
        let model_path = config.model_path(install_dir);

        log::info!("Loading feature scaler from: {}", scaler_path.display());
        let scaler = FeatureScaler::load(&scaler_path)?;

        log::info!("Loading emotion model from: {}", model_path.display());
        let model = load_model(&model_path, config.analysis.feature_len())?;

        let pipeline = Self::new(&config.analysis, Arc::new(scaler), Arc::from(model))?;
        log::info!(
            "Pipeline ready ({} features per segment)",
            pipeline.feature_len()
        );
        Ok(pipeline)
    }

    pub fn feature_len(&self) -> usize {
        self.extractor.feature_len()
    }

    /// Run the full sequence on one request
    pub fn analyze(&self, request: &AnalysisRequest) -> Result<EmotionReport> {
        self.analyze_with_features(request).map(|(report, _)| report)
    }

    /// Like [`analyze`](Self::analyze), also handing back the unscaled features
    pub fn analyze_with_features(
        &self,
        request: &AnalysisRequest,
    ) -> Result<(EmotionReport, FeatureVector)> {
        let key_code = encode_key_label(&request.key);

        let features = self.extractor.extract(
            &request.samples,
            request.sample_rate,
            request.bpm as f32,
            key_code,
        )?;
        let scaled = self.scaler.transform(&features)?;
        let prediction = self.model.predict(&scaled)?;

        if !prediction.valence.is_finite() || !prediction.arousal.is_finite() {
            return Err(MoodError::ProcessingFailed(format!(
                "model produced non-finite output (valence={}, arousal={})",
                prediction.valence, prediction.arousal
            )));
        }

        let emotion = classify_emotion(
            prediction.valence,
            prediction.arousal,
            request.bpm,
            &request.key,
        );

        log::debug!(
            "valence={:.3} arousal={:.3} -> {}",
            prediction.valence,
            prediction.arousal,
            emotion
        );

        let report = EmotionReport {
            valence: prediction.valence as f64,
            arousal: prediction.arousal as f64,
            emotion,
            processed: true,
        };
        Ok((report, features))
    }

    /// Analyze a request, converting any failure into an error response
    pub fn process(&self, request: &AnalysisRequest) -> Response {
        match self.analyze(request) {
            Ok(report) => Response::from(report),
            Err(e) => failure_response(e),
        }
    }

    /// [`process`](Self::process), keeping the feature vector of a successful run
    pub fn process_with_features(
        &self,
        request: &AnalysisRequest,
    ) -> (Response, Option<FeatureVector>) {
        match self.analyze_with_features(request) {
            Ok((report, features)) => (Response::from(report), Some(features)),
            Err(e) => (failure_response(e), None),
        }
    }

    /// Decode and analyze a payload read from disk
    pub fn process_raw(&self, raw: RawPayload) -> Response {
        match raw.decode() {
            Ok(request) => {
                log::debug!(
                    "Request: {} samples @ {}Hz, key={:?}, bpm={}",
                    request.samples.len(),
                    request.sample_rate,
                    request.key,
                    request.bpm
                );
                self.process(&request)
            }
            Err(e) => failure_response(MoodError::ProcessingFailed(e.to_string())),
        }
    }
}

fn failure_response(err: MoodError) -> Response {
    let err = err.into_processing_failed();
    log::warn!("{}", err);
    Response::error(err.to_string())
}
