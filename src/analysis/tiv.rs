//! Tonal Interval Vector representation and algebra
//!
//! A TIV is the Fourier-domain view of a pitch class profile: the 12-point
//! DFT's zero-order term (`energy`) plus coefficients 1..=6 (`vector`).
//! Because the profile is real-valued, coefficients 7..=11 are conjugates
//! of the stored half and are never kept. Transposition is a pure phase
//! rotation: it changes the argument of each coefficient and nothing else.

use crate::types::PitchClassProfile;
use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

/// Number of retained DFT coefficients beyond the zero-order term
pub const NUM_COEFFICIENTS: usize = 6;

/// A tonal fingerprint of one track
#[derive(Debug, Clone, PartialEq)]
pub struct Tiv {
    /// Zero-order DFT term; real and non-negative when built from a profile,
    /// but persisted as a full complex value
    pub energy: Complex64,
    /// DFT coefficients 1..=6, optionally consonance-weighted
    pub vector: [Complex64; NUM_COEFFICIENTS],
}

impl Tiv {
    /// Build a TIV from a pitch class profile
    ///
    /// `weights[i]` scales coefficient i+1; pass `&[1.0; 6]` for the
    /// unweighted transform.
    pub fn from_pcp(pcp: &PitchClassProfile, weights: &[f64; NUM_COEFFICIENTS]) -> Self {
        let bins = pcp.bins();
        let mut coefficients = [Complex64::new(0.0, 0.0); NUM_COEFFICIENTS + 1];

        for (k, coefficient) in coefficients.iter_mut().enumerate() {
            let mut acc = Complex64::new(0.0, 0.0);
            for (n, &value) in bins.iter().enumerate() {
                let angle = -2.0 * PI * (k * n) as f64 / 12.0;
                acc += value * Complex64::new(angle.cos(), angle.sin());
            }
            *coefficient = acc;
        }

        let mut vector = [Complex64::new(0.0, 0.0); NUM_COEFFICIENTS];
        for (i, v) in vector.iter_mut().enumerate() {
            *v = coefficients[i + 1] * weights[i];
        }

        Self {
            energy: coefficients[0],
            vector,
        }
    }

    /// Transpose in place by `shift` semitones
    ///
    /// Coefficient k is rotated by `exp(-i 2π k shift / 12)`; the energy
    /// term carries no phase and is untouched. A whole-octave shift is an
    /// exact identity. Callers sharing a TIV across concurrent comparisons
    /// must use [`Tiv::transposed`] instead.
    pub fn transpose(&mut self, shift: i32) {
        let shift = shift.rem_euclid(12);
        if shift == 0 {
            return;
        }

        for (i, coefficient) in self.vector.iter_mut().enumerate() {
            let k = (i + 1) as f64;
            let angle = -2.0 * PI * k * shift as f64 / 12.0;
            *coefficient *= Complex64::new(angle.cos(), angle.sin());
        }
    }

    /// Pure transposition: returns a new TIV, leaving `self` untouched
    pub fn transposed(&self, shift: i32) -> Self {
        let mut out = self.clone();
        out.transpose(shift);
        out
    }

    /// Per-coefficient normalized dissimilarity to another TIV
    ///
    /// Each entry is `|a - b| / (|a| + |b|)`, in [0, 1]; a pair of zero
    /// coefficients contributes 0. The caller chooses the reduction (the
    /// compatibility engine takes the arithmetic mean).
    pub fn distance(&self, other: &Tiv) -> [f64; NUM_COEFFICIENTS] {
        let mut out = [0.0f64; NUM_COEFFICIENTS];
        for (i, d) in out.iter_mut().enumerate() {
            let denominator = self.vector[i].norm() + other.vector[i].norm();
            if denominator > f64::EPSILON {
                *d = (self.vector[i] - other.vector[i]).norm() / denominator;
            }
        }
        out
    }
}
