//! Short-time Fourier transform
//!
//! Centered, Hann-windowed frames with zero padding of `n_fft / 2` on both
//! sides, so every non-empty signal produces at least one frame.

use crate::config::AnalysisConfig;
use crate::error::{MoodError, Result};
use rustfft::{num_complex::Complex, FftPlanner};
use std::f32::consts::PI;

/// Magnitude spectrogram
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Magnitude values [time_frame][frequency_bin]
    pub magnitudes: Vec<Vec<f32>>,
    /// Number of time frames
    pub num_frames: usize,
    /// Number of frequency bins (`n_fft / 2 + 1`)
    pub num_bins: usize,
    pub sample_rate: f32,
    pub n_fft: usize,
}

impl Spectrogram {
    /// Squared magnitudes, same layout as `magnitudes`
    pub fn power(&self) -> Vec<Vec<f32>> {
        self.magnitudes
            .iter()
            .map(|frame| frame.iter().map(|m| m * m).collect())
            .collect()
    }

    /// Center frequency of every bin in Hz
    pub fn bin_frequencies(&self) -> Vec<f32> {
        fft_frequencies(self.sample_rate, self.n_fft)
    }
}

/// Compute the magnitude STFT of a mono signal
pub fn compute_stft(samples: &[f32], sample_rate: f32, config: &AnalysisConfig) -> Result<Spectrogram> {
    if samples.is_empty() {
        return Err(MoodError::InvalidAudioInput("sample sequence is empty".into()));
    }
    if !(sample_rate > 0.0) {
        return Err(MoodError::InvalidAudioInput(format!(
            "sample rate must be positive, got {}",
            sample_rate
        )));
    }

    let fft_size = config.n_fft;
    let hop_size = config.hop_length;
    let num_bins = fft_size / 2 + 1;

    let padded = pad_center(samples, fft_size / 2);
    let num_frames = 1 + (padded.len() - fft_size) / hop_size;

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);
    let window = create_hann_window(fft_size);

    let mut magnitudes = Vec::with_capacity(num_frames);
    let mut frame = vec![Complex::new(0.0f32, 0.0); fft_size];

    for frame_idx in 0..num_frames {
        let start = frame_idx * hop_size;

        for (i, slot) in frame.iter_mut().enumerate() {
            *slot = Complex::new(padded[start + i] * window[i], 0.0);
        }

        fft.process(&mut frame);

        magnitudes.push(frame[..num_bins].iter().map(|c| c.norm()).collect());
    }

    Ok(Spectrogram {
        magnitudes,
        num_frames,
        num_bins,
        sample_rate,
        n_fft: fft_size,
    })
}

/// Frequencies of the non-negative FFT bins
pub fn fft_frequencies(sample_rate: f32, n_fft: usize) -> Vec<f32> {
    (0..=n_fft / 2)
        .map(|k| k as f32 * sample_rate / n_fft as f32)
        .collect()
}

/// Periodic Hann window
fn create_hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let x = i as f32 / size as f32;
            0.5 * (1.0 - (2.0 * PI * x).cos())
        })
        .collect()
}

fn pad_center(samples: &[f32], pad: usize) -> Vec<f32> {
    let mut padded = vec![0.0; samples.len() + 2 * pad];
    padded[pad..pad + samples.len()].copy_from_slice(samples);
    padded
}

/// Convert power values to decibels, clipped to `top_db` below the peak
pub fn power_to_db(values: &mut [f32], top_db: f32) {
    const AMIN: f32 = 1e-10;

    let mut peak = f32::NEG_INFINITY;
    for v in values.iter_mut() {
        *v = 10.0 * v.max(AMIN).log10();
        peak = peak.max(*v);
    }

    let floor = peak - top_db;
    for v in values.iter_mut() {
        *v = v.max(floor);
    }
}
