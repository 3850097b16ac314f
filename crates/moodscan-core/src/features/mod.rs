//! Fixed-length feature vector extraction
//!
//! Layout (must match the order the scaler and model were fit on):
//!
//! | range     | content                              |
//! |-----------|--------------------------------------|
//! | 0..10     | mean of each cepstral coefficient    |
//! | 10..22    | mean of each chroma bin              |
//! | 22        | mean spectral contrast (all bands)   |
//! | 23        | tempo (BPM)                          |
//! | 24        | key code                             |
//!
//! (indices shown for the default configuration; total width 25)

pub mod chroma;
pub mod contrast;
pub mod mel;

use crate::config::AnalysisConfig;
use crate::error::{MoodError, Result};
use crate::transform;

/// Raw, unscaled features of one segment
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(pub Vec<f32>);

impl FeatureVector {
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

/// Feature extractor
pub struct FeatureExtractor {
    config: AnalysisConfig,
}

impl FeatureExtractor {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Output width for this configuration
    pub fn feature_len(&self) -> usize {
        self.config.feature_len()
    }

    /// Extract the feature vector of one segment
    pub fn extract(
        &self,
        samples: &[f32],
        sample_rate: i64,
        tempo: f32,
        key_code: u8,
    ) -> Result<FeatureVector> {
        if samples.is_empty() {
            return Err(MoodError::InvalidAudioInput("sample sequence is empty".into()));
        }
        if sample_rate <= 0 {
            return Err(MoodError::InvalidAudioInput(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }

        let config = &self.config;
        let spectrogram = transform::compute_stft(samples, sample_rate as f32, config)?;

        let mfcc = mel::mfcc(&spectrogram, config.n_mels, config.n_mfcc, config.top_db);
        let chroma = chroma::chroma_stft(&spectrogram, config.n_chroma);
        let contrast = contrast::spectral_contrast(
            &spectrogram,
            config.contrast_fmin,
            config.contrast_bands,
            config.contrast_quantile,
            config.top_db,
        );

        let mut features = Vec::with_capacity(self.feature_len());
        features.extend(column_means(&mfcc, config.n_mfcc));
        features.extend(column_means(&chroma, config.n_chroma));
        features.push(overall_mean(&contrast));
        features.push(tempo);
        features.push(key_code as f32);

        if features.len() != self.feature_len() {
            return Err(MoodError::FeatureShapeMismatch {
                expected: self.feature_len(),
                actual: features.len(),
            });
        }

        log::debug!(
            "Extracted {} features from {} frames",
            features.len(),
            spectrogram.num_frames
        );

        Ok(FeatureVector(features))
    }
}

/// Mean over frames of each of the `width` columns of a [frame][column] matrix
fn column_means(rows: &[Vec<f32>], width: usize) -> Vec<f32> {
    let mut sums = vec![0.0f64; width];
    for row in rows {
        for (sum, &v) in sums.iter_mut().zip(row) {
            *sum += v as f64;
        }
    }
    let n = rows.len().max(1) as f64;
    sums.into_iter().map(|s| (s / n) as f32).collect()
}

fn overall_mean(rows: &[Vec<f32>]) -> f32 {
    let count: usize = rows.iter().map(|r| r.len()).sum();
    if count == 0 {
        return 0.0;
    }
    let sum: f64 = rows.iter().flatten().map(|&v| v as f64).sum();
    (sum / count as f64) as f32
}
