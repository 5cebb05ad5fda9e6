//! File discovery and scanning
//!
//! A music folder is flat: tracks live at the top level with an
//! `annotations/` subdirectory beside them, so the scan does not recurse.

use crate::error::{HarmixError, Result};
use crate::types::{AudioFormat, Track};
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Scan a path (file or directory) for audio tracks
///
/// A single supported file yields one track; an unsupported single file is
/// an error. Directory scans silently skip non-audio entries and are sorted
/// by path for reproducible batch order.
pub fn scan(input: &Path) -> Result<Vec<Track>> {
    if !input.exists() {
        return Err(HarmixError::FileNotFound(input.to_path_buf()));
    }

    let mut tracks = Vec::new();

    if input.is_file() {
        if AudioFormat::is_supported_path(input) {
            tracks.push(Track::new(input));
        } else {
            return Err(HarmixError::UnsupportedFormat {
                path: input.to_path_buf(),
                format: input
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            });
        }
    } else if input.is_dir() {
        for entry in WalkDir::new(input)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && AudioFormat::is_supported_path(path) {
                debug!("Discovered: {}", path.display());
                tracks.push(Track::new(path));
            }
        }
    }

    info!("Discovered {} audio tracks", tracks.len());

    if tracks.is_empty() {
        warn!("No supported audio files found in {}", input.display());
    }

    Ok(tracks)
}
