//! The canonical analysis configuration
//!
//! Every tunable of the pipeline lives here, with one documented default
//! set. Annotations produced under different configurations are not
//! comparable, so a deployment should pick one configuration and keep it.

/// Fixed tunables of the analysis pipeline
///
/// `AnalysisConfig::default()` is the canonical configuration; the reference
/// material this tool derives from used several mutually inconsistent
/// constant sets, so the defaults below are the single set harmix commits to.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Target sample rate for decoding (Hz)
    pub sample_rate: u32,
    /// Fraction of the track analyzed, taken as a centered excerpt
    pub kept_fraction: f64,

    /// STFT frame length for harmonic/percussive separation
    pub separation_fft_len: usize,
    /// STFT hop length for harmonic/percussive separation
    pub separation_hop_len: usize,
    /// Median filter length along the time axis (frames); enhances
    /// horizontally coherent (sustained) energy
    pub harmonic_kernel: usize,
    /// Median filter length along the frequency axis (bins); enhances
    /// vertically coherent (transient) energy
    pub percussive_kernel: usize,

    /// Analysis frame length for chroma estimation
    pub chroma_frame_len: usize,
    /// Hop length for chroma estimation
    pub chroma_hop_len: usize,

    /// Per-coefficient consonance weights applied when building a TIV.
    ///
    /// No authoritative weight vector is supplied with this tool, so the
    /// default is uniform; numeric output therefore deviates from any
    /// reference that used perceptual weighting.
    pub consonance_weights: [f64; 6],
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            kept_fraction: 0.3,
            separation_fft_len: 2048,
            separation_hop_len: 512,
            harmonic_kernel: 13,
            percussive_kernel: 31,
            chroma_frame_len: 16384,
            chroma_hop_len: 2048,
            consonance_weights: [1.0; 6],
        }
    }
}

impl AnalysisConfig {
    /// Sanity-check the configuration before running a pipeline with it
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample_rate must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.kept_fraction) || self.kept_fraction == 0.0 {
            return Err("kept_fraction must be in (0, 1]".into());
        }
        if self.separation_hop_len == 0 || self.separation_hop_len > self.separation_fft_len {
            return Err("separation hop must be in (0, fft_len]".into());
        }
        if self.chroma_hop_len == 0 || self.chroma_hop_len > self.chroma_frame_len {
            return Err("chroma hop must be in (0, frame_len]".into());
        }
        if self.harmonic_kernel == 0 || self.percussive_kernel == 0 {
            return Err("median filter kernels must be positive".into());
        }
        Ok(())
    }
}
