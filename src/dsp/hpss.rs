//! Harmonic/percussive separation by median filtering
//!
//! Median-filters the magnitude spectrogram along the time axis (enhancing
//! horizontally coherent, sustained energy) and along the frequency axis
//! (enhancing vertically coherent, transient energy), then soft-masks the
//! complex spectrogram with the Wiener-style ratio of the two estimates
//! (Fitzgerald 2010). Only the harmonic component is reconstructed; the
//! percussive part is discarded.

use crate::config::AnalysisConfig;
use crate::dsp::stft::{istft, stft};

/// Exponent of the soft mask ratio
const MASK_POWER: f32 = 2.0;

/// Avoids 0/0 in masked bins with no energy in either estimate
const EPSILON: f32 = 1e-10;

/// Extract the harmonic (sustained/tonal) part of a mono signal
///
/// The output has the same length as the input. A signal shorter than one
/// separation frame is returned unchanged, there is nothing to separate.
pub fn separate_harmonic(samples: &[f32], config: &AnalysisConfig) -> Vec<f32> {
    if samples.len() < config.separation_fft_len {
        return samples.to_vec();
    }

    let mut spec = stft(samples, config.separation_fft_len, config.separation_hop_len);
    let magnitudes = spec.magnitudes();

    let harmonic = median_filter_time(&magnitudes, config.harmonic_kernel);
    let percussive = median_filter_frequency(&magnitudes, config.percussive_kernel);

    // Soft mask: H^p / (H^p + P^p), applied to the complex coefficients
    for (t, frame) in spec.frames.iter_mut().enumerate() {
        for (b, coeff) in frame.iter_mut().enumerate() {
            let h = harmonic[t][b].powf(MASK_POWER);
            let p = percussive[t][b].powf(MASK_POWER);
            let mask = (h + EPSILON / 2.0) / (h + p + EPSILON);
            *coeff *= mask;
        }
    }

    istft(&spec, samples.len())
}

/// Median filter each frequency bin across time
fn median_filter_time(magnitudes: &[Vec<f32>], kernel: usize) -> Vec<Vec<f32>> {
    let num_frames = magnitudes.len();
    let num_bins = magnitudes.first().map_or(0, |f| f.len());
    let half = kernel / 2;

    let mut out = vec![vec![0.0f32; num_bins]; num_frames];
    let mut window = Vec::with_capacity(kernel);

    for b in 0..num_bins {
        for t in 0..num_frames {
            let lo = t.saturating_sub(half);
            let hi = (t + half + 1).min(num_frames);
            window.clear();
            window.extend((lo..hi).map(|i| magnitudes[i][b]));
            out[t][b] = median(&mut window);
        }
    }

    out
}

/// Median filter each frame across frequency
fn median_filter_frequency(magnitudes: &[Vec<f32>], kernel: usize) -> Vec<Vec<f32>> {
    let num_frames = magnitudes.len();
    let num_bins = magnitudes.first().map_or(0, |f| f.len());
    let half = kernel / 2;

    let mut out = vec![vec![0.0f32; num_bins]; num_frames];
    let mut window = Vec::with_capacity(kernel);

    for t in 0..num_frames {
        for b in 0..num_bins {
            let lo = b.saturating_sub(half);
            let hi = (b + half + 1).min(num_bins);
            window.clear();
            window.extend_from_slice(&magnitudes[t][lo..hi]);
            out[t][b] = median(&mut window);
        }
    }

    out
}

/// Median of a scratch buffer (reordered in place)
fn median(values: &mut [f32]) -> f32 {
    debug_assert!(!values.is_empty());
    let mid = values.len() / 2;
    let (_, m, _) = values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
    *m
}
