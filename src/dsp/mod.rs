//! Signal-processing primitives shared by the analysis stages

pub mod hpss;
pub mod nnls;
pub mod stft;

pub use hpss::separate_harmonic;
pub use nnls::nnls;
pub use stft::{hann_window, istft, stft, Spectrogram};
