//! ONNX Runtime backend
//!
//! `Session::run` needs `&mut self`, so the session sits behind a mutex. The
//! worker is single-threaded and the lock is never contended there.

use super::{check_input, EmotionModel, Prediction};
use crate::error::{MoodError, Result};
use crate::scaler::ScaledFeatures;
use ndarray::Array2;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;

pub struct OnnxModel {
    session: Mutex<Session>,
    input_dim: usize,
}

impl OnnxModel {
    /// Load an ONNX graph taking a `[1, input_dim]` float tensor and
    /// returning `[1, 2]` (valence, arousal)
    pub fn load(path: &Path, input_dim: usize) -> Result<Self> {
        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(1))
            .and_then(|b| b.commit_from_file(path))
            .map_err(|e| {
                MoodError::ModelLoad(format!("cannot load ONNX model {}: {}", path.display(), e))
            })?;

        Ok(Self {
            session: Mutex::new(session),
            input_dim,
        })
    }
}

impl EmotionModel for OnnxModel {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn predict(&self, features: &ScaledFeatures) -> Result<Prediction> {
        check_input(self, features)?;

        let input = Array2::from_shape_vec((1, features.len()), features.as_slice().to_vec())
            .map_err(|e| MoodError::ProcessingFailed(format!("model input shape error: {}", e)))?;
        let input_tensor = Tensor::from_array(input)
            .map_err(|e| MoodError::ProcessingFailed(format!("model tensor creation error: {}", e)))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| MoodError::ProcessingFailed("model session lock poisoned".into()))?;
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| MoodError::ProcessingFailed(format!("model inference error: {}", e)))?;

        let (_, value) = outputs
            .iter()
            .next()
            .ok_or_else(|| MoodError::ProcessingFailed("model produced no output".into()))?;
        let (_shape, data) = value
            .try_extract_tensor::<f32>()
            .map_err(|e| MoodError::ProcessingFailed(format!("model output extraction error: {}", e)))?;

        match data {
            [valence, arousal, ..] => Ok(Prediction {
                valence: *valence,
                arousal: *arousal,
            }),
            _ => Err(MoodError::ProcessingFailed(format!(
                "model produced {} values, expected 2",
                data.len()
            ))),
        }
    }
}
