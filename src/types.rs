//! Core data types for harmix
//!
//! These types represent the domain model and flow through the pipeline.

use std::path::{Path, PathBuf};

/// Name of the sibling directory holding per-track annotations
pub const ANNOTATION_DIR: &str = "annotations";

/// File extension of annotation records
pub const ANNOTATION_EXT: &str = "json";

// =============================================================================
// Track identity
// =============================================================================

/// A music track identified by its filesystem path
///
/// The display name and annotation path are derived, never stored: the
/// annotation for `/music/house/track.mp3` lives at
/// `/music/house/annotations/track.json`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Track {
    path: PathBuf,
}

impl Track {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name: the file stem, without extension
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    /// Where this track's annotation lives (whether or not it exists yet)
    pub fn annotation_path(&self) -> PathBuf {
        let dir = self
            .path
            .parent()
            .map(|p| p.join(ANNOTATION_DIR))
            .unwrap_or_else(|| PathBuf::from(ANNOTATION_DIR));
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_os_string())
            .unwrap_or_default();
        let mut file = PathBuf::from(stem);
        file.set_extension(ANNOTATION_EXT);
        dir.join(file)
    }
}

impl From<&Path> for Track {
    fn from(path: &Path) -> Self {
        Track::new(path)
    }
}

// =============================================================================
// Audio buffer
// =============================================================================

/// Decoded audio samples ready for analysis
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Mono samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Duration in seconds
    pub duration: f64,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        // Guard against division by zero - use 0 duration for invalid sample rate
        let duration = if sample_rate > 0 {
            samples.len() as f64 / sample_rate as f64
        } else {
            0.0
        };
        Self {
            samples,
            sample_rate,
            duration,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// =============================================================================
// Pitch class profile
// =============================================================================

/// A 12-bin pitch class profile (chroma), index 0 = pitch class C
///
/// Bins are non-negative but carry no normalization invariant: downstream
/// code must not assume they sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchClassProfile {
    bins: [f64; 12],
}

impl PitchClassProfile {
    pub fn new(bins: [f64; 12]) -> Self {
        Self { bins }
    }

    pub fn bins(&self) -> &[f64; 12] {
        &self.bins
    }

    /// Circular rotation by `semitones` (positive = up in pitch)
    ///
    /// Rotating up by s moves the energy of pitch class n to class n + s.
    pub fn rotated(&self, semitones: i32) -> Self {
        let mut out = [0.0f64; 12];
        for (n, &v) in self.bins.iter().enumerate() {
            let dst = (n as i32 + semitones).rem_euclid(12) as usize;
            out[dst] = v;
        }
        Self { bins: out }
    }

    /// True if every bin is finite and at least one carries energy
    pub fn is_usable(&self) -> bool {
        self.bins.iter().all(|v| v.is_finite()) && self.bins.iter().any(|&v| v > 0.0)
    }
}

// =============================================================================
// Comparison result
// =============================================================================

/// Result of comparing two tracks, after display scaling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompatibilityResult {
    /// Compatibility of the tracks as given (candidate possibly pre-shifted
    /// by the caller's hint), as a scaled percentage
    pub compatibility: f64,
    /// Semitone shift of the candidate that maximizes compatibility
    pub best_shift: i32,
    /// Compatibility after applying `best_shift`, as a scaled percentage
    pub best_compatibility: f64,
}

// =============================================================================
// Supported formats
// =============================================================================

/// Audio formats harmix can decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
    Flac,
    Aiff,
}

impl AudioFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "wav" => Some(AudioFormat::Wav),
            "flac" => Some(AudioFormat::Flac),
            "aiff" | "aif" => Some(AudioFormat::Aiff),
            _ => None,
        }
    }

    /// Check if a path has a supported extension
    pub fn is_supported_path(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
            .is_some()
    }
}
