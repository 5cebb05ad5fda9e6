//! Sequential batch analysis and folder comparison
//!
//! Tracks are processed strictly one at a time, with fractional progress
//! reported after each. Recoverable per-track failures (bad file, silent
//! excerpt) are recorded and the batch continues; annotation errors on a
//! compare surface immediately because the user has to act on them.

use crate::annotations::AnnotationStore;
use crate::discovery;
use crate::error::{HarmixError, Result};
use crate::session::Session;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of a batch analysis
#[derive(Debug)]
pub struct BatchResult {
    pub total: usize,
    pub analyzed: usize,
    pub already_analyzed: usize,
    /// Tracks that failed with a recoverable error, with the message
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchResult {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// One line of a folder comparison table
#[derive(Debug, Clone)]
pub struct TableRow {
    pub name: String,
    pub compatibility: f64,
    pub best_shift: i32,
    pub best_compatibility: f64,
}

/// Analyze every track in a folder (or a single file), sequentially
///
/// Progress is reported after each track, mirroring what a front end would
/// show. Recoverable errors are collected instead of aborting the batch;
/// fatal errors (annotation write failures) still propagate.
pub fn analyze_folder<S: AnnotationStore>(
    session: &Session<S>,
    input: &Path,
    show_progress: bool,
) -> Result<BatchResult> {
    let tracks = discovery::scan(input)?;
    let total = tracks.len();

    let progress_bar = if show_progress && total > 0 {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut result = BatchResult {
        total,
        analyzed: 0,
        already_analyzed: 0,
        failures: Vec::new(),
    };

    for (index, track) in tracks.iter().enumerate() {
        let existed = session.annotation_exists(track);

        match session.analyze(track.path()) {
            Ok(()) => {
                if existed {
                    result.already_analyzed += 1;
                } else {
                    result.analyzed += 1;
                }
            }
            Err(e) if e.is_recoverable() => {
                warn!("Skipping {}: {}", track.path().display(), e);
                result.failures.push((track.path().to_path_buf(), e.to_string()));
            }
            Err(e) => return Err(e),
        }

        let done = index + 1;
        info!(
            "{:.1}% progress completed ({}/{})",
            done as f64 * 100.0 / total as f64,
            done,
            total
        );
        if let Some(ref pb) = progress_bar {
            pb.inc(1);
            pb.set_message(track.name());
        }
    }

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Analysis completed");
    }

    info!(
        "Batch done: {} analyzed, {} already analyzed, {} failed (of {})",
        result.analyzed,
        result.already_analyzed,
        result.failed(),
        result.total
    );

    Ok(result)
}

/// Compare a current track against every analyzed track in a folder
///
/// Tracks without an annotation are skipped with a warning (a partially
/// analyzed folder is a normal state); a corrupt annotation still fails
/// the call, the user must re-analyze that track.
pub fn compare_folder<S: AnnotationStore>(
    session: &Session<S>,
    current: &Path,
    folder: &Path,
) -> Result<Vec<TableRow>> {
    let tracks = discovery::scan(folder)?;
    let mut rows = Vec::with_capacity(tracks.len());

    for track in &tracks {
        match session.compare(current, track.path(), 0) {
            Ok(result) => rows.push(TableRow {
                name: track.name(),
                compatibility: result.compatibility,
                best_shift: result.best_shift,
                best_compatibility: result.best_compatibility,
            }),
            Err(HarmixError::NotAnalyzed(path)) if path != current => {
                warn!("Skipping {} (not analyzed)", track.name());
            }
            Err(e) => return Err(e),
        }
    }

    Ok(rows)
}
