//! Mel filterbank and cepstral coefficients

use crate::transform::{fft_frequencies, power_to_db, Spectrogram};
use std::f32::consts::PI;

const F_SP: f32 = 200.0 / 3.0;
const MIN_LOG_HZ: f32 = 1000.0;
const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;

fn log_step() -> f32 {
    6.4f32.ln() / 27.0
}

/// Slaney mel scale: linear below 1 kHz, logarithmic above
pub fn hz_to_mel(hz: f32) -> f32 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

pub fn mel_to_hz(mel: f32) -> f32 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        F_SP * mel
    }
}

/// Triangular, area-normalized mel filters spanning 0 Hz to Nyquist.
///
/// Returns `n_mels` filters of `n_fft / 2 + 1` weights each.
pub fn mel_filterbank(sample_rate: f32, n_fft: usize, n_mels: usize) -> Vec<Vec<f32>> {
    let fft_freqs = fft_frequencies(sample_rate, n_fft);

    let mel_max = hz_to_mel(sample_rate / 2.0);
    let mel_f: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
        .collect();

    (0..n_mels)
        .map(|m| {
            let lower_width = mel_f[m + 1] - mel_f[m];
            let upper_width = mel_f[m + 2] - mel_f[m + 1];
            let enorm = 2.0 / (mel_f[m + 2] - mel_f[m]);

            fft_freqs
                .iter()
                .map(|&f| {
                    let lower = (f - mel_f[m]) / lower_width;
                    let upper = (mel_f[m + 2] - f) / upper_width;
                    lower.min(upper).max(0.0) * enorm
                })
                .collect()
        })
        .collect()
}

/// Cepstral coefficients [frame][coefficient]
///
/// Power spectrogram -> mel bands -> dB -> orthonormal DCT-II, keeping the
/// first `n_mfcc` coefficients.
pub fn mfcc(spectrogram: &Spectrogram, n_mels: usize, n_mfcc: usize, top_db: f32) -> Vec<Vec<f32>> {
    let filters = mel_filterbank(spectrogram.sample_rate, spectrogram.n_fft, n_mels);

    let mut mel_db: Vec<f32> = Vec::with_capacity(spectrogram.num_frames * n_mels);
    for frame in &spectrogram.magnitudes {
        for filter in &filters {
            let energy: f32 = filter
                .iter()
                .zip(frame.iter())
                .map(|(w, m)| w * m * m)
                .sum();
            mel_db.push(energy);
        }
    }
    // top_db is relative to the peak of the whole mel spectrogram
    power_to_db(&mut mel_db, top_db);

    let basis = dct_basis(n_mels, n_mfcc);
    mel_db
        .chunks(n_mels)
        .map(|bands| {
            basis
                .iter()
                .map(|row| row.iter().zip(bands).map(|(b, x)| b * x).sum())
                .collect()
        })
        .collect()
}

/// Orthonormal DCT-II rows `[k][n]` for k < n_out
fn dct_basis(n: usize, n_out: usize) -> Vec<Vec<f32>> {
    let n_f = n as f32;
    (0..n_out)
        .map(|k| {
            let scale = if k == 0 {
                (1.0 / n_f).sqrt()
            } else {
                (2.0 / n_f).sqrt()
            };
            (0..n)
                .map(|i| scale * (PI * k as f32 * (2 * i + 1) as f32 / (2.0 * n_f)).cos())
                .collect()
        })
        .collect()
}
