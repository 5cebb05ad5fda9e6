//! The core API surface: analyze one track, compare two
//!
//! A `Session` bundles the analysis configuration with an annotation store
//! and replaces the shared mutable state a UI would otherwise keep. Each
//! call is independent; a session holds no per-track state between calls.

use crate::analysis::{best_shift, chroma, compatibility, scale, Tiv};
use crate::annotations::{AnnotationStore, FsAnnotationStore};
use crate::audio;
use crate::config::AnalysisConfig;
use crate::dsp::separate_harmonic;
use crate::error::{HarmixError, Result};
use crate::types::{CompatibilityResult, Track};
use std::path::Path;
use tracing::{debug, info};

/// Analysis session: configuration plus annotation backend
pub struct Session<S: AnnotationStore = FsAnnotationStore> {
    config: AnalysisConfig,
    store: S,
}

impl Session<FsAnnotationStore> {
    /// Session with the canonical configuration and filesystem annotations
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            store: FsAnnotationStore::new(),
        }
    }
}

impl Default for Session<FsAnnotationStore> {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl<S: AnnotationStore> Session<S> {
    /// Session over an alternative annotation backend
    pub fn with_store(config: AnalysisConfig, store: S) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Whether a track already has a persisted annotation
    pub fn annotation_exists(&self, track: &Track) -> bool {
        self.store.exists(track)
    }

    /// Analyze a track and persist its TIV; idempotent
    ///
    /// Returns immediately when an annotation already exists. The existing
    /// annotation is authoritative even if the audio file changed since it
    /// was written.
    pub fn analyze(&self, path: &Path) -> Result<()> {
        let track = Track::new(path);

        if self.store.exists(&track) {
            info!("{} already analyzed", track.name());
            return Ok(());
        }

        info!("Analyzing {}", track.name());
        let tiv = self.compute_tiv(&track)?;
        self.store.put(&track, &tiv)?;

        Ok(())
    }

    /// Compare two analyzed tracks
    ///
    /// `transpose_hint` simulates pitch-shifting the candidate by that many
    /// semitones before the direct comparison; the best-shift search always
    /// runs against the untransposed candidate. Both percentages pass
    /// through the display scaling.
    pub fn compare(
        &self,
        current: &Path,
        candidate: &Path,
        transpose_hint: i32,
    ) -> Result<CompatibilityResult> {
        let tiv_current = self.store.get(&Track::new(current))?;
        let tiv_candidate = self.store.get(&Track::new(candidate))?;

        // Pure transposition: the search below must see the original
        let hinted = tiv_candidate.transposed(transpose_hint);
        let direct = compatibility(&tiv_current, &hinted);

        let (shift, best) = best_shift(&tiv_current, &tiv_candidate);

        debug!(
            "compare: direct={:.4}, best={:.4} at {:+} st",
            direct, best, shift
        );

        Ok(CompatibilityResult {
            compatibility: scale(100.0 * direct),
            best_shift: shift,
            best_compatibility: scale(100.0 * best),
        })
    }

    /// Run the full signal chain for one track
    fn compute_tiv(&self, track: &Track) -> Result<Tiv> {
        let buffer = audio::decode(track.path(), self.config.sample_rate)?;
        let excerpt = audio::centered_excerpt(&buffer.samples, self.config.kept_fraction);

        let harmonic = separate_harmonic(excerpt, &self.config);

        let pcp = chroma::estimate(&harmonic, &self.config).ok_or_else(|| {
            HarmixError::computation(
                track.path(),
                format!(
                    "Excerpt too short for chroma analysis ({} samples, need {})",
                    harmonic.len(),
                    self.config.chroma_frame_len
                ),
            )
        })?;

        if !pcp.is_usable() {
            return Err(HarmixError::computation(
                track.path(),
                "Degenerate pitch class profile (silent or non-finite excerpt)",
            ));
        }

        Ok(Tiv::from_pcp(&pcp, &self.config.consonance_weights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tiv::NUM_COEFFICIENTS;
    use crate::types::PitchClassProfile;
    use tempfile::TempDir;

    fn seed_annotation(dir: &TempDir, name: &str, pcp: &PitchClassProfile) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let track = Track::new(&path);
        let tiv = Tiv::from_pcp(pcp, &[1.0; NUM_COEFFICIENTS]);
        FsAnnotationStore::new().put(&track, &tiv).unwrap();
        path
    }

    fn sample_pcp() -> PitchClassProfile {
        PitchClassProfile::new([
            0.9, 0.1, 0.4, 0.05, 0.6, 0.3, 0.02, 0.8, 0.1, 0.5, 0.07, 0.2,
        ])
    }

    #[test]
    fn test_compare_identical_tivs_is_perfect() {
        let dir = TempDir::new().unwrap();
        let a = seed_annotation(&dir, "a.mp3", &sample_pcp());
        let b = seed_annotation(&dir, "b.mp3", &sample_pcp());

        let session = Session::default();
        let result = session.compare(&a, &b, 0).unwrap();

        assert!((result.compatibility - 100.0).abs() < 1e-9);
        assert_eq!(result.best_shift, 0);
        assert!((result.best_compatibility - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_compare_rotated_candidate_suggests_inverse_shift() {
        let dir = TempDir::new().unwrap();
        let a = seed_annotation(&dir, "a.mp3", &sample_pcp());
        let b = seed_annotation(&dir, "b.mp3", &sample_pcp().rotated(2));

        let session = Session::default();
        let result = session.compare(&a, &b, 0).unwrap();

        assert_eq!(result.best_shift, -2);
        assert!((result.best_compatibility - 100.0).abs() < 1e-6);
        // Unshifted, the rotated profile is a worse match
        assert!(result.compatibility < result.best_compatibility);
    }

    #[test]
    fn test_compare_hint_applies_to_direct_score_only() {
        let dir = TempDir::new().unwrap();
        let a = seed_annotation(&dir, "a.mp3", &sample_pcp());
        let b = seed_annotation(&dir, "b.mp3", &sample_pcp().rotated(2));

        let session = Session::default();
        // Hinting the correcting shift makes the direct score perfect
        let result = session.compare(&a, &b, -2).unwrap();
        assert!((result.compatibility - 100.0).abs() < 1e-6);
        // The search result is unaffected by the hint
        assert_eq!(result.best_shift, -2);
    }

    #[test]
    fn test_compare_unanalyzed_track_is_typed() {
        let dir = TempDir::new().unwrap();
        let a = seed_annotation(&dir, "a.mp3", &sample_pcp());
        let missing = dir.path().join("never.mp3");

        let session = Session::default();
        let err = session.compare(&a, &missing, 0).unwrap_err();
        assert!(matches!(err, HarmixError::NotAnalyzed(_)));

        let err = session.compare(&missing, &a, 0).unwrap_err();
        assert!(matches!(err, HarmixError::NotAnalyzed(_)));
    }

    #[test]
    fn test_analyze_missing_file_is_typed() {
        let dir = TempDir::new().unwrap();
        let session = Session::default();
        let err = session
            .analyze(&dir.path().join("ghost.mp3"))
            .unwrap_err();
        assert!(matches!(err, HarmixError::FileNotFound(_)));
    }
}
