//! Annotation persistence
//!
//! The store gives analyze-once semantics: a TIV is written the first time
//! a track is analyzed and read back thereafter. An existing annotation is
//! authoritative; nothing checks it against the source track's modification
//! time (a known limitation, inherited by design). The trait keeps the
//! TIV/compatibility engines independent of the backend so an embedded or
//! remote cache could replace the filesystem layout.

use crate::analysis::Tiv;
use crate::annotations::record::AnnotationRecord;
use crate::error::{HarmixError, Result};
use crate::types::Track;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use tracing::debug;

/// A key-value cache of one TIV per track
pub trait AnnotationStore {
    /// Whether an annotation exists for the track
    fn exists(&self, track: &Track) -> bool;

    /// Load the track's TIV, failing with `NotAnalyzed` when absent and
    /// `CorruptAnnotation` when unreadable
    fn get(&self, track: &Track) -> Result<Tiv>;

    /// Persist the track's TIV, creating the backing location lazily
    fn put(&self, track: &Track, tiv: &Tiv) -> Result<()>;
}

/// Filesystem-backed store: one JSON record per track in a sibling
/// `annotations/` directory
///
/// Single-process, non-concurrent access is assumed; callers introducing
/// parallelism must serialize operations on the same track externally.
#[derive(Debug, Default, Clone)]
pub struct FsAnnotationStore;

impl FsAnnotationStore {
    pub fn new() -> Self {
        Self
    }
}

impl AnnotationStore for FsAnnotationStore {
    fn exists(&self, track: &Track) -> bool {
        track.annotation_path().is_file()
    }

    fn get(&self, track: &Track) -> Result<Tiv> {
        let path = track.annotation_path();
        if !path.is_file() {
            return Err(HarmixError::NotAnalyzed(track.path().to_path_buf()));
        }

        let file = File::open(&path).map_err(|e| HarmixError::CorruptAnnotation {
            path: path.clone(),
            reason: format!("Failed to open: {}", e),
        })?;

        let record: AnnotationRecord = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| HarmixError::CorruptAnnotation {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        if !record.is_finite() {
            return Err(HarmixError::CorruptAnnotation {
                path,
                reason: "Record holds non-finite values".to_string(),
            });
        }

        Ok(record.to_tiv())
    }

    fn put(&self, track: &Track, tiv: &Tiv) -> Result<()> {
        let path = track.annotation_path();

        // Lazy directory creation, first write wins
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| HarmixError::output_error(dir, e))?;
        }

        let file = File::create(&path).map_err(|e| HarmixError::output_error(&path, e))?;
        let record = AnnotationRecord::from_tiv(tiv);
        serde_json::to_writer(BufWriter::new(file), &record).map_err(|e| HarmixError::Output {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        debug!("Wrote annotation {}", path.display());
        Ok(())
    }
}
