//! Short-time Fourier transform for mono signals
//!
//! Frames are aligned starting at sample 0 with no centering, Hann windowed.
//! The inverse transform uses overlap-add with COLA (Constant Overlap-Add)
//! normalization, so `istft(stft(x))` reconstructs `x` up to the window
//! taper at the signal edges.

use rustfft::{num_complex::Complex, FftPlanner};

/// Complex spectrogram of a mono signal
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Frames of positive-frequency coefficients: [time_frames][fft_len/2 + 1]
    pub frames: Vec<Vec<Complex<f32>>>,
    /// FFT window length in samples
    pub fft_len: usize,
    /// Hop between consecutive frames in samples
    pub hop_len: usize,
}

impl Spectrogram {
    /// Number of positive-frequency bins per frame
    pub fn num_bins(&self) -> usize {
        self.fft_len / 2 + 1
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// Magnitudes of every frame: [time_frames][bins]
    pub fn magnitudes(&self) -> Vec<Vec<f32>> {
        self.frames
            .iter()
            .map(|frame| frame.iter().map(|c| c.norm()).collect())
            .collect()
    }
}

/// Compute the STFT of a mono signal
pub fn stft(samples: &[f32], fft_len: usize, hop_len: usize) -> Spectrogram {
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_len);
    let window = hann_window(fft_len);
    let num_bins = fft_len / 2 + 1;

    let num_frames = if samples.len() >= fft_len {
        (samples.len() - fft_len) / hop_len + 1
    } else {
        0
    };

    let mut frames = Vec::with_capacity(num_frames);
    let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); fft_len];

    for frame_idx in 0..num_frames {
        let start = frame_idx * hop_len;
        for (i, &w) in window.iter().enumerate() {
            buffer[i] = Complex::new(samples[start + i] * w, 0.0);
        }

        fft.process(&mut buffer);
        frames.push(buffer[..num_bins].to_vec());
    }

    Spectrogram {
        frames,
        fft_len,
        hop_len,
    }
}

/// Reconstruct a time-domain signal from a spectrogram
///
/// Overlap-adds windowed inverse transforms and normalizes by the summed
/// squared window.
pub fn istft(spec: &Spectrogram, output_len: usize) -> Vec<f32> {
    let fft_len = spec.fft_len;
    let num_bins = spec.num_bins();
    let mut planner = FftPlanner::new();
    let ifft = planner.plan_fft_inverse(fft_len);
    let window = hann_window(fft_len);

    let mut output = vec![0.0f32; output_len];
    let mut window_sum = vec![0.0f32; output_len];
    let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); fft_len];

    for (frame_idx, frame) in spec.frames.iter().enumerate() {
        let start = frame_idx * spec.hop_len;

        // Rebuild the full spectrum from the conjugate-symmetric half
        buffer.fill(Complex::new(0.0, 0.0));
        for (i, &c) in frame.iter().enumerate() {
            buffer[i] = c;
        }
        for i in 1..num_bins - 1 {
            buffer[fft_len - i] = frame[i].conj();
        }

        ifft.process(&mut buffer);

        let scale = 1.0 / fft_len as f32;
        for (i, &w) in window.iter().enumerate() {
            if start + i < output_len {
                output[start + i] += buffer[i].re * scale * w;
                window_sum[start + i] += w * w;
            }
        }
    }

    // COLA normalization
    for (out, &ws) in output.iter_mut().zip(window_sum.iter()) {
        if ws > 1e-8 {
            *out /= ws;
        }
    }

    output
}

/// Generate a Hann window of the given size
pub fn hann_window(size: usize) -> Vec<f32> {
    use std::f32::consts::PI;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / size as f32).cos()))
        .collect()
}
