//! harmix - Harmonic Compatibility Analysis for DJ Sets
//!
//! A command-line utility that fingerprints the tonal content of audio
//! tracks and scores how well two tracks mix harmonically, including the
//! best pitch shift to apply to the incoming track. Fingerprints are
//! cached as JSON annotations next to the audio files.
//!
//! # Architecture
//!
//! The library is organized into several key modules:
//!
//! - `config`: CLI argument parsing and analysis settings
//! - `discovery`: Folder scanning for supported audio files
//! - `audio`: Audio decoding and resampling using symphonia
//! - `dsp`: STFT, harmonic/percussive separation, non-negative least squares
//! - `analysis`: Chroma estimation, tonal interval vectors, compatibility
//! - `annotations`: Persistent per-track fingerprint storage
//! - `session`: The analyze/compare API surface
//! - `pipeline`: Sequential batch orchestration
//!
//! # Example
//!
//! ```no_run
//! use harmix::{config::AnalysisConfig, Session};
//! use std::path::Path;
//!
//! let session = Session::new(AnalysisConfig::default());
//! session.analyze(Path::new("set/track_a.mp3")).expect("analysis failed");
//! session.analyze(Path::new("set/track_b.mp3")).expect("analysis failed");
//! let result = session
//!     .compare(Path::new("set/track_a.mp3"), Path::new("set/track_b.mp3"), 0)
//!     .expect("comparison failed");
//! println!("{:.1}% compatible", result.compatibility);
//! ```

pub mod analysis;
pub mod annotations;
pub mod audio;
pub mod config;
pub mod discovery;
pub mod dsp;
pub mod error;
pub mod pipeline;
pub mod session;
pub mod types;

// Re-export key types at crate root
pub use analysis::Tiv;
pub use error::{HarmixError, Result};
pub use session::Session;
pub use types::{CompatibilityResult, PitchClassProfile, Track};
