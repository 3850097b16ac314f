//! Chromagram from a short-time power spectrum

use crate::transform::Spectrogram;

/// Center octave of the Gaussian octave weighting
const CENTER_OCTAVE: f64 = 5.0;
/// Width (in octaves) of the octave weighting
const OCTAVE_WIDTH: f64 = 2.0;

/// Map FFT bins onto `n_chroma` pitch classes.
///
/// Returns `[chroma][bin]` weights over the `n_fft / 2 + 1` non-negative bins.
/// Each bin is a Gaussian bump around its fractional pitch class, columns are
/// L2-normalized, weighted towards the middle octaves and rotated so that
/// index 0 is C. Tuning is assumed to be A440.
pub fn chroma_filterbank(sample_rate: f32, n_fft: usize, n_chroma: usize) -> Vec<Vec<f32>> {
    let n_chroma_f = n_chroma as f64;
    let sr = sample_rate as f64;

    // Fractional chroma position of every FFT bin (bin 0 gets a placeholder
    // one and a half octaves below bin 1)
    let mut frqbins: Vec<f64> = (1..n_fft)
        .map(|k| n_chroma_f * hz_to_octs(k as f64 * sr / n_fft as f64))
        .collect();
    let first = frqbins.first().copied().unwrap_or(0.0);
    frqbins.insert(0, first - 1.5 * n_chroma_f);

    let mut binwidths: Vec<f64> = frqbins
        .windows(2)
        .map(|w| (w[1] - w[0]).max(1.0))
        .collect();
    binwidths.push(1.0);

    let half = (n_chroma_f / 2.0).round();
    let mut weights = vec![vec![0.0f64; n_fft]; n_chroma];
    for (c, row) in weights.iter_mut().enumerate() {
        for (k, w) in row.iter_mut().enumerate() {
            let d = (frqbins[k] - c as f64 + half + 10.0 * n_chroma_f).rem_euclid(n_chroma_f) - half;
            *w = (-0.5 * (2.0 * d / binwidths[k]).powi(2)).exp();
        }
    }

    for k in 0..n_fft {
        let norm = weights.iter().map(|row| row[k] * row[k]).sum::<f64>().sqrt();
        if norm > f64::MIN_POSITIVE {
            for row in weights.iter_mut() {
                row[k] /= norm;
            }
        }

        let octave_weight =
            (-0.5 * ((frqbins[k] / n_chroma_f - CENTER_OCTAVE) / OCTAVE_WIDTH).powi(2)).exp();
        for row in weights.iter_mut() {
            row[k] *= octave_weight;
        }
    }

    // Rotate from A-based to C-based pitch classes
    weights.rotate_left((3 * (n_chroma / 12)) % n_chroma);

    let num_bins = n_fft / 2 + 1;
    weights
        .into_iter()
        .map(|row| row[..num_bins].iter().map(|&w| w as f32).collect())
        .collect()
}

/// Octave number relative to C0 (A440 tuning)
fn hz_to_octs(hz: f64) -> f64 {
    (hz / (440.0 / 16.0)).log2()
}

/// Chromagram [frame][pitch_class], each frame scaled so its largest bin is 1.
///
/// Frames without energy are left at zero.
pub fn chroma_stft(spectrogram: &Spectrogram, n_chroma: usize) -> Vec<Vec<f32>> {
    let filters = chroma_filterbank(spectrogram.sample_rate, spectrogram.n_fft, n_chroma);

    spectrogram
        .magnitudes
        .iter()
        .map(|frame| {
            let mut chroma: Vec<f32> = filters
                .iter()
                .map(|filter| filter.iter().zip(frame).map(|(w, m)| w * m * m).sum())
                .collect();

            let peak = chroma.iter().fold(0.0f32, |acc, v| acc.max(v.abs()));
            if peak > f32::MIN_POSITIVE {
                for v in chroma.iter_mut() {
                    *v /= peak;
                }
            }
            chroma
        })
        .collect()
}
