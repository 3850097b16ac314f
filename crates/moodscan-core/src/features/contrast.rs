//! Octave-band spectral contrast

use crate::transform::{power_to_db, Spectrogram};

/// Number of octave bands above `fmin` that fit below Nyquist, capped at `max_bands`
pub fn fitting_band_count(sample_rate: f32, fmin: f32, max_bands: usize) -> usize {
    let nyquist = sample_rate / 2.0;
    (0..=max_bands)
        .rev()
        .find(|&b| fmin * 2f32.powi(b as i32) < nyquist)
        .unwrap_or(0)
}

/// Spectral contrast [frame][band] in dB.
///
/// Band 0 spans 0..fmin, band k spans fmin·2^(k-1)..fmin·2^k and the last band
/// extends to Nyquist. For each band and frame the mean of the top and bottom
/// `quantile` fraction of magnitudes are compared in decibels. When the
/// requested bands would reach Nyquist the count is reduced until they fit.
pub fn spectral_contrast(
    spectrogram: &Spectrogram,
    fmin: f32,
    n_bands: usize,
    quantile: f32,
    top_db: f32,
) -> Vec<Vec<f32>> {
    let n_bands = fitting_band_count(spectrogram.sample_rate, fmin, n_bands);
    if n_bands == 0 {
        log::debug!(
            "Sample rate {} too low for contrast bands above {} Hz",
            spectrogram.sample_rate,
            fmin
        );
    }

    let freqs = spectrogram.bin_frequencies();
    let num_rows = n_bands + 1;
    let num_frames = spectrogram.num_frames;

    let mut edges = vec![0.0f32];
    edges.extend((0..=n_bands).map(|b| fmin * 2f32.powi(b as i32)));

    let mut peak = vec![0.0f32; num_rows * num_frames];
    let mut valley = vec![0.0f32; num_rows * num_frames];
    let mut empty_band = vec![false; num_rows];

    for k in 0..num_rows {
        let Some(bins) = band_bins(&freqs, edges[k], edges[k + 1], k, n_bands) else {
            empty_band[k] = true;
            continue;
        };

        let q = ((quantile * bins.selected as f32).round() as usize).max(1);
        let q = q.min(bins.range.len());

        let mut sorted = Vec::with_capacity(bins.range.len());
        for (t, frame) in spectrogram.magnitudes.iter().enumerate() {
            sorted.clear();
            sorted.extend_from_slice(&frame[bins.range.clone()]);
            sorted.sort_by(|a, b| a.total_cmp(b));

            let low: f32 = sorted[..q].iter().sum::<f32>() / q as f32;
            let high: f32 = sorted[sorted.len() - q..].iter().sum::<f32>() / q as f32;
            valley[k * num_frames + t] = low;
            peak[k * num_frames + t] = high;
        }
    }

    power_to_db(&mut peak, top_db);
    power_to_db(&mut valley, top_db);

    (0..num_frames)
        .map(|t| {
            (0..num_rows)
                .map(|k| {
                    if empty_band[k] {
                        0.0
                    } else {
                        peak[k * num_frames + t] - valley[k * num_frames + t]
                    }
                })
                .collect()
        })
        .collect()
}

struct BandBins {
    /// Bins whose magnitudes are ranked
    range: std::ops::Range<usize>,
    /// Bin count used to size the quantile
    selected: usize,
}

/// Select the FFT bins of band `k`.
///
/// Bands above the first borrow the bin just below their lower edge; the last
/// band extends to Nyquist; every band but the last drops its top bin from
/// ranking.
fn band_bins(freqs: &[f32], f_low: f32, f_high: f32, k: usize, n_bands: usize) -> Option<BandBins> {
    let first = freqs.iter().position(|&f| f >= f_low && f <= f_high)?;
    let last = freqs.iter().rposition(|&f| f >= f_low && f <= f_high)?;

    let start = if k > 0 { first.saturating_sub(1) } else { first };
    let end = if k == n_bands { freqs.len() } else { last + 1 };
    let selected = end - start;

    let ranked_end = if k < n_bands { end - 1 } else { end };
    if ranked_end <= start {
        return None;
    }

    Some(BandBins {
        range: start..ranked_end,
        selected,
    })
}
