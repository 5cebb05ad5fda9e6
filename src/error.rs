//! Unified error types for harmix
//!
//! Error strategy:
//! - Per-track errors (decode, degenerate audio): Recoverable, skip and continue
//! - Annotation errors on compare (not analyzed, corrupt record): Surface
//!   immediately to the caller, they are user-actionable
//! - System errors (output, config): Fatal, abort batch

use std::path::PathBuf;
use thiserror::Error;

/// Supported audio formats for helpful error messages
pub const SUPPORTED_FORMATS: &str = "MP3, WAV, FLAC, AIFF";

/// Top-level error type for harmix operations
#[derive(Debug, Error)]
pub enum HarmixError {
    // =========================================================================
    // Recoverable errors - skip track, continue batch
    // =========================================================================
    #[error("Failed to decode audio file '{path}': {reason}\n  Supported formats: {SUPPORTED_FORMATS}\n  Tip: If the file plays in other apps, it may be corrupted or use an unsupported codec")]
    Decode { path: PathBuf, reason: String },

    #[error("Unsupported audio format for '{path}': {format}\n  Supported formats: {SUPPORTED_FORMATS}")]
    UnsupportedFormat { path: PathBuf, format: String },

    #[error("File not found: '{0}'\n  Tip: Check the path exists and is accessible")]
    FileNotFound(PathBuf),

    #[error("Analysis failed for '{path}': {reason}")]
    Computation { path: PathBuf, reason: String },

    // =========================================================================
    // Annotation errors - user-actionable, never swallowed by a batch
    // =========================================================================
    #[error("Track '{0}' has not been analyzed yet\n  Tip: Run `harmix analyze` on it (or its folder) before comparing")]
    NotAnalyzed(PathBuf),

    #[error("Corrupt annotation at '{path}': {reason}\n  Tip: Delete the file and re-analyze the track")]
    CorruptAnnotation { path: PathBuf, reason: String },

    // =========================================================================
    // Fatal errors - abort entire batch
    // =========================================================================
    #[error("Cannot write annotation to '{path}': {reason}\n  Tip: Check write permissions for the annotations directory")]
    Output { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for harmix operations
pub type Result<T> = std::result::Result<T, HarmixError>;

impl HarmixError {
    /// Returns true if this error is recoverable (skip track, continue batch)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            HarmixError::Decode { .. }
                | HarmixError::UnsupportedFormat { .. }
                | HarmixError::FileNotFound(_)
                | HarmixError::Computation { .. }
        )
    }

    /// Create a decode error with context about the issue
    pub fn decode_error(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        HarmixError::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a computation error for a degenerate analysis result
    pub fn computation(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        HarmixError::Computation {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an output error, checking for common issues
    pub fn output_error(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        let path = path.into();
        let reason = match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                format!(
                    "Permission denied. Check that you have write access to {}",
                    path.display()
                )
            }
            std::io::ErrorKind::NotFound => {
                format!(
                    "Directory does not exist: {}",
                    path.parent()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default()
                )
            }
            _ => err.to_string(),
        };
        HarmixError::Output { path, reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_track_errors_are_recoverable() {
        let err = HarmixError::decode_error("/music/broken.mp3", "bad header");
        assert!(err.is_recoverable());

        let err = HarmixError::computation("/music/silence.mp3", "empty chroma");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_annotation_errors_are_not_recoverable() {
        let err = HarmixError::NotAnalyzed(PathBuf::from("/music/track.mp3"));
        assert!(!err.is_recoverable());

        let err = HarmixError::CorruptAnnotation {
            path: PathBuf::from("/music/annotations/track.json"),
            reason: "missing field".into(),
        };
        assert!(!err.is_recoverable());
    }
}
