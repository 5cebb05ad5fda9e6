//! NNLS chroma estimation
//!
//! Reduces the harmonic part of a track to a single 12-bin pitch class
//! profile: frame-wise Hann-windowed magnitude spectra are remapped onto a
//! log-frequency axis and fitted, per frame, as a non-negative combination
//! of pitch-class harmonic templates. Fitting against templates (rather
//! than folding bins directly) suppresses the spurious energy a tone leaves
//! at the pitch classes of its upper harmonics. Frame chromas are averaged
//! arithmetically and rotated to put pitch class C at index 0.

use crate::config::AnalysisConfig;
use crate::dsp::nnls::nnls;
use crate::dsp::stft::stft;
use crate::types::PitchClassProfile;
use tracing::debug;

/// Resolution of the log-frequency axis
const BINS_PER_SEMITONE: usize = 3;

/// Lowest note on the log-frequency axis (A0 = MIDI 21, 27.5 Hz)
const LOWEST_MIDI: f64 = 21.0;

/// Semitone span of the log-frequency axis (A0 up to just short of A7)
const SEMITONE_SPAN: usize = 84;

/// Total number of log-frequency bins
const LOG_BINS: usize = SEMITONE_SPAN * BINS_PER_SEMITONE;

/// Number of partials in each harmonic template
const TEMPLATE_PARTIALS: usize = 20;

/// Geometric amplitude rolloff between successive partials
const TEMPLATE_ROLLOFF: f64 = 0.7;

/// Rotation applied to the averaged chroma so index 0 is pitch class C.
///
/// The log-frequency axis starts at A0, so the raw fit is A-based; rolling
/// by -3 brings C (three classes above A) to the front. This is a property
/// of the estimator, not a tunable.
const CHROMA_ROTATION: i32 = -3;

/// Estimate a single pitch class profile from a harmonic signal
///
/// Returns `None` when the signal is shorter than one analysis frame;
/// degeneracy of the values themselves (silence, NaN) is the caller's
/// concern via [`PitchClassProfile::is_usable`].
pub fn estimate(harmonic: &[f32], config: &AnalysisConfig) -> Option<PitchClassProfile> {
    let spec = stft(harmonic, config.chroma_frame_len, config.chroma_hop_len);
    if spec.num_frames() == 0 {
        return None;
    }

    let dictionary = pitch_class_templates();
    let mut sum = [0.0f64; 12];

    for frame in &spec.frames {
        let magnitudes: Vec<f32> = frame.iter().map(|c| c.norm()).collect();
        let log_spectrum = log_frequency_spectrum(
            &magnitudes,
            config.chroma_frame_len,
            config.sample_rate,
        );

        let activation = nnls(&dictionary, &log_spectrum);
        for (acc, a) in sum.iter_mut().zip(activation.iter()) {
            *acc += a;
        }
    }

    let num_frames = spec.num_frames() as f64;
    let mut mean = [0.0f64; 12];
    for (m, s) in mean.iter_mut().zip(sum.iter()) {
        *m = s / num_frames;
    }

    debug!("Chroma estimated over {} frames", spec.num_frames());

    Some(PitchClassProfile::new(mean).rotated(CHROMA_ROTATION))
}

/// Remap a linear magnitude spectrum onto the log-frequency axis
///
/// Each FFT bin's magnitude is distributed linearly between the two
/// log-frequency bins bracketing its center frequency.
fn log_frequency_spectrum(magnitudes: &[f32], fft_len: usize, sample_rate: u32) -> Vec<f64> {
    let mut out = vec![0.0f64; LOG_BINS];
    let bin_hz = sample_rate as f64 / fft_len as f64;

    for (k, &mag) in magnitudes.iter().enumerate().skip(1) {
        let freq = k as f64 * bin_hz;
        let Some(pos) = log_bin_position(freq) else {
            continue;
        };

        let lower = pos.floor();
        let frac = pos - lower;
        let lower = lower as usize;

        out[lower] += mag as f64 * (1.0 - frac);
        if lower + 1 < LOG_BINS {
            out[lower + 1] += mag as f64 * frac;
        }
    }

    out
}

/// Fractional position of a frequency on the log axis, if in range
fn log_bin_position(freq_hz: f64) -> Option<f64> {
    if freq_hz <= 0.0 {
        return None;
    }
    let midi = 69.0 + 12.0 * (freq_hz / 440.0).log2();
    let pos = (midi - LOWEST_MIDI) * BINS_PER_SEMITONE as f64;
    if pos < 0.0 || pos >= (LOG_BINS - 1) as f64 {
        None
    } else {
        Some(pos)
    }
}

fn midi_to_hz(midi: f64) -> f64 {
    440.0 * ((midi - 69.0) / 12.0).exp2()
}

/// Build the 12 pitch-class harmonic templates over the log-frequency axis
///
/// Pitch class 0 here is A (the axis origin). Each template sums, over every
/// octave of its class in range, a partial series with geometric rolloff,
/// and is normalized to unit Euclidean length so activations are comparable
/// across classes.
fn pitch_class_templates() -> Vec<Vec<f64>> {
    let mut templates = vec![vec![0.0f64; LOG_BINS]; 12];

    for (pc, template) in templates.iter_mut().enumerate() {
        let mut midi = LOWEST_MIDI + pc as f64;
        while midi < LOWEST_MIDI + SEMITONE_SPAN as f64 {
            let fundamental = midi_to_hz(midi);
            for partial in 1..=TEMPLATE_PARTIALS {
                let freq = fundamental * partial as f64;
                let Some(pos) = log_bin_position(freq) else {
                    break;
                };
                let amp = TEMPLATE_ROLLOFF.powi(partial as i32 - 1);

                let lower = pos.floor();
                let frac = pos - lower;
                let lower = lower as usize;
                template[lower] += amp * (1.0 - frac);
                if lower + 1 < LOG_BINS {
                    template[lower + 1] += amp * frac;
                }
            }
            midi += 12.0;
        }

        let norm = template.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for v in template.iter_mut() {
                *v /= norm;
            }
        }
    }

    templates
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tone(freq: f32, config: &AnalysisConfig, seconds: f32) -> Vec<f32> {
        let sr = config.sample_rate as f32;
        (0..(sr * seconds) as usize)
            .map(|i| 0.5 * (2.0 * PI * freq * i as f32 / sr).sin())
            .collect()
    }

    fn argmax(bins: &[f64; 12]) -> usize {
        bins.iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap()
    }

    #[test]
    fn test_log_bin_position_of_reference_pitches() {
        // A0 sits at the axis origin
        assert!(log_bin_position(27.5).unwrap().abs() < 1e-9);
        // A4 (440 Hz) is 48 semitones above A0
        let a4 = log_bin_position(440.0).unwrap();
        assert!((a4 - 48.0 * BINS_PER_SEMITONE as f64).abs() < 1e-9);
        // Out of range
        assert!(log_bin_position(10.0).is_none());
        assert!(log_bin_position(20000.0).is_none());
    }

    #[test]
    fn test_templates_are_normalized_and_non_negative() {
        for template in pitch_class_templates() {
            assert!(template.iter().all(|&v| v >= 0.0));
            let norm = template.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_too_short_signal_yields_none() {
        let config = AnalysisConfig::default();
        let samples = vec![0.0f32; 1000];
        assert!(estimate(&samples, &config).is_none());
    }

    #[test]
    fn test_silence_yields_unusable_profile() {
        let config = AnalysisConfig::default();
        let samples = vec![0.0f32; config.chroma_frame_len + 1];
        let pcp = estimate(&samples, &config).unwrap();
        assert!(!pcp.is_usable());
    }

    #[test]
    fn test_pure_a4_peaks_at_pitch_class_a() {
        let config = AnalysisConfig::default();
        let samples = tone(440.0, &config, 1.5);
        let pcp = estimate(&samples, &config).unwrap();
        assert!(pcp.is_usable());
        // Index 9 is A in a C-origin profile
        assert_eq!(argmax(pcp.bins()), 9, "bins: {:?}", pcp.bins());
    }

    #[test]
    fn test_pure_c4_peaks_at_pitch_class_c() {
        let config = AnalysisConfig::default();
        let samples = tone(261.63, &config, 1.5);
        let pcp = estimate(&samples, &config).unwrap();
        assert_eq!(argmax(pcp.bins()), 0, "bins: {:?}", pcp.bins());
    }

    #[test]
    fn test_profile_is_non_negative() {
        let config = AnalysisConfig::default();
        let samples = tone(329.63, &config, 1.0);
        let pcp = estimate(&samples, &config).unwrap();
        assert!(pcp.bins().iter().all(|&v| v >= 0.0));
    }
}
