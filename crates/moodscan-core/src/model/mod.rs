//! Pretrained valence/arousal regression
//!
//! The model is an opaque artifact behind [`EmotionModel`]. Two formats load:
//! a JSON export of a dense feed-forward network, and (with the `onnx`
//! feature) an ONNX graph run through ONNX Runtime.

mod dense;
#[cfg(feature = "onnx")]
mod onnx;

pub use dense::{Activation, DenseLayer, DenseNetwork};
#[cfg(feature = "onnx")]
pub use onnx::OnnxModel;

use crate::error::{MoodError, Result};
use crate::scaler::ScaledFeatures;
use std::path::Path;

/// Raw model output, on the scale the model was trained on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub valence: f32,
    pub arousal: f32,
}

/// A loaded regression model. Implementations are immutable after loading.
pub trait EmotionModel: Send + Sync {
    /// Expected input width
    fn input_dim(&self) -> usize;

    fn predict(&self, features: &ScaledFeatures) -> Result<Prediction>;
}

/// Load a model artifact, choosing the backend from the file extension.
///
/// `input_dim` is the feature width the caller will feed; formats that do not
/// record their own input width (ONNX) take it from here.
#[cfg_attr(not(feature = "onnx"), allow(unused_variables))]
pub fn load_model(path: &Path, input_dim: usize) -> Result<Box<dyn EmotionModel>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Box::new(DenseNetwork::load(path)?)),
        #[cfg(feature = "onnx")]
        Some("onnx") => Ok(Box::new(OnnxModel::load(path, input_dim)?)),
        #[cfg(not(feature = "onnx"))]
        Some("onnx") => Err(MoodError::ModelLoad(
            "ONNX models require the `onnx` feature".into(),
        )),
        other => Err(MoodError::ModelLoad(format!(
            "unsupported model format {:?}: {}",
            other.unwrap_or(""),
            path.display()
        ))),
    }
}

/// Check that an input matches the width a model expects
pub(crate) fn check_input(model: &dyn EmotionModel, features: &ScaledFeatures) -> Result<()> {
    if features.len() != model.input_dim() {
        return Err(MoodError::FeatureShapeMismatch {
            expected: model.input_dim(),
            actual: features.len(),
        });
    }
    Ok(())
}
