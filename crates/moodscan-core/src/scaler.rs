//! Pretrained feature scaler
//!
//! Loaded from a JSON export of the scaler fitted at training time:
//!
//! ```json
//! {"kind": "standard", "mean": [...], "scale": [...]}
//! {"kind": "min_max", "min": [...], "scale": [...]}
//! ```

use crate::error::{MoodError, Result};
use crate::features::FeatureVector;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Features after the pretrained affine transform; only meaningful as model input
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledFeatures(pub Vec<f32>);

impl ScaledFeatures {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Per-feature affine transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureScaler {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f32>, scale: Vec<f32> },
    /// `x * scale + min`
    MinMax { min: Vec<f32>, scale: Vec<f32> },
}

impl FeatureScaler {
    /// Load from a JSON scaler file
    pub fn load(path: &Path) -> Result<Self> {
        let json_str = std::fs::read_to_string(path).map_err(|e| {
            MoodError::ModelLoad(format!("cannot read scaler {}: {}", path.display(), e))
        })?;
        let scaler: FeatureScaler = serde_json::from_str(&json_str).map_err(|e| {
            MoodError::ModelLoad(format!("cannot parse scaler {}: {}", path.display(), e))
        })?;
        scaler.validate()?;
        Ok(scaler)
    }

    /// Check that parameter vectors agree and are usable
    pub fn validate(&self) -> Result<()> {
        let (offset, scale) = self.params();
        if offset.is_empty() {
            return Err(MoodError::ModelLoad("scaler has no parameters".into()));
        }
        if offset.len() != scale.len() {
            return Err(MoodError::ModelLoad(format!(
                "scaler parameter lengths differ: {} vs {}",
                offset.len(),
                scale.len()
            )));
        }
        if offset.iter().chain(scale).any(|v| !v.is_finite()) {
            return Err(MoodError::ModelLoad("scaler parameters must be finite".into()));
        }
        if let FeatureScaler::MinMax { scale, .. } = self {
            if scale.iter().any(|&s| s == 0.0) {
                return Err(MoodError::ModelLoad("min-max scale must be non-zero".into()));
            }
        }
        Ok(())
    }

    /// Number of features the scaler was fitted on
    pub fn dim(&self) -> usize {
        self.params().0.len()
    }

    pub fn transform(&self, features: &FeatureVector) -> Result<ScaledFeatures> {
        self.check_len(features.len())?;
        let values = match self {
            FeatureScaler::Standard { mean, scale } => features
                .as_slice()
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(&x, (&m, &s))| (x - m) / effective_scale(s))
                .collect(),
            FeatureScaler::MinMax { min, scale } => features
                .as_slice()
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(&x, (&lo, &s))| x * s + lo)
                .collect(),
        };
        Ok(ScaledFeatures(values))
    }

    pub fn inverse_transform(&self, scaled: &ScaledFeatures) -> Result<FeatureVector> {
        self.check_len(scaled.len())?;
        let values = match self {
            FeatureScaler::Standard { mean, scale } => scaled
                .as_slice()
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(&z, (&m, &s))| z * effective_scale(s) + m)
                .collect(),
            FeatureScaler::MinMax { min, scale } => scaled
                .as_slice()
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(&z, (&lo, &s))| (z - lo) / s)
                .collect(),
        };
        Ok(FeatureVector(values))
    }

    fn params(&self) -> (&[f32], &[f32]) {
        match self {
            FeatureScaler::Standard { mean, scale } => (mean, scale),
            FeatureScaler::MinMax { min, scale } => (min, scale),
        }
    }

    fn check_len(&self, actual: usize) -> Result<()> {
        if actual != self.dim() {
            return Err(MoodError::FeatureShapeMismatch {
                expected: self.dim(),
                actual,
            });
        }
        Ok(())
    }
}

/// Constant features are fitted with a zero scale; those pass through unscaled
fn effective_scale(s: f32) -> f32 {
    if s == 0.0 {
        1.0
    } else {
        s
    }
}
