//! Feature extraction parameters
//!
//! The defaults reproduce the feature definition the pretrained scaler and
//! model were fit on. Changing them changes the meaning of every feature.

use serde::{Deserialize, Serialize};

/// Feature extraction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // Short-time Fourier transform
    pub n_fft: usize,
    pub hop_length: usize,

    // Cepstral summary
    pub n_mfcc: usize,
    pub n_mels: usize,

    // Pitch-class summary
    pub n_chroma: usize,

    // Spectral contrast
    pub contrast_fmin: f32,
    pub contrast_bands: usize,
    pub contrast_quantile: f32,

    /// Dynamic range kept when converting power to decibels
    pub top_db: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,

            n_mfcc: 10,
            n_mels: 128,

            n_chroma: 12,

            contrast_fmin: 200.0,
            contrast_bands: 6,
            contrast_quantile: 0.02,

            top_db: 80.0,
        }
    }
}

impl AnalysisConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.n_fft < 2 {
            anyhow::bail!("n_fft must be >= 2");
        }
        if self.hop_length == 0 {
            anyhow::bail!("hop_length must be > 0");
        }
        if self.n_mfcc == 0 || self.n_mfcc > self.n_mels {
            anyhow::bail!("n_mfcc must be in 1..=n_mels");
        }
        if self.n_chroma == 0 {
            anyhow::bail!("n_chroma must be > 0");
        }
        if self.contrast_fmin <= 0.0 {
            anyhow::bail!("contrast_fmin must be > 0");
        }
        if !(self.contrast_quantile > 0.0 && self.contrast_quantile < 1.0) {
            anyhow::bail!("contrast_quantile must be in (0, 1)");
        }
        if self.top_db <= 0.0 {
            anyhow::bail!("top_db must be > 0");
        }
        Ok(())
    }

    /// Width of the feature vector: cepstral means, chroma means, contrast, tempo, key
    pub fn feature_len(&self) -> usize {
        self.n_mfcc + self.n_chroma + 3
    }
}
