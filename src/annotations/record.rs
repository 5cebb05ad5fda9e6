//! On-disk annotation schema
//!
//! One flat key/value JSON object per track, holding the real and imaginary
//! parts of the TIV energy and its six coefficients under exactly these
//! field names. The schema is a wire format shared with earlier tools;
//! field names must not change.

use crate::analysis::tiv::Tiv;
use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Serialized form of one TIV
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    #[serde(rename = "TIV.energy.real")]
    pub energy_real: f64,
    #[serde(rename = "TIV.energy.imag")]
    pub energy_imag: f64,

    #[serde(rename = "TIV.vector[0].real")]
    pub vector0_real: f64,
    #[serde(rename = "TIV.vector[0].imag")]
    pub vector0_imag: f64,
    #[serde(rename = "TIV.vector[1].real")]
    pub vector1_real: f64,
    #[serde(rename = "TIV.vector[1].imag")]
    pub vector1_imag: f64,
    #[serde(rename = "TIV.vector[2].real")]
    pub vector2_real: f64,
    #[serde(rename = "TIV.vector[2].imag")]
    pub vector2_imag: f64,
    #[serde(rename = "TIV.vector[3].real")]
    pub vector3_real: f64,
    #[serde(rename = "TIV.vector[3].imag")]
    pub vector3_imag: f64,
    #[serde(rename = "TIV.vector[4].real")]
    pub vector4_real: f64,
    #[serde(rename = "TIV.vector[4].imag")]
    pub vector4_imag: f64,
    #[serde(rename = "TIV.vector[5].real")]
    pub vector5_real: f64,
    #[serde(rename = "TIV.vector[5].imag")]
    pub vector5_imag: f64,
}

impl AnnotationRecord {
    pub fn from_tiv(tiv: &Tiv) -> Self {
        let v = &tiv.vector;
        Self {
            energy_real: tiv.energy.re,
            energy_imag: tiv.energy.im,
            vector0_real: v[0].re,
            vector0_imag: v[0].im,
            vector1_real: v[1].re,
            vector1_imag: v[1].im,
            vector2_real: v[2].re,
            vector2_imag: v[2].im,
            vector3_real: v[3].re,
            vector3_imag: v[3].im,
            vector4_real: v[4].re,
            vector4_imag: v[4].im,
            vector5_real: v[5].re,
            vector5_imag: v[5].im,
        }
    }

    pub fn to_tiv(&self) -> Tiv {
        Tiv {
            energy: Complex64::new(self.energy_real, self.energy_imag),
            vector: [
                Complex64::new(self.vector0_real, self.vector0_imag),
                Complex64::new(self.vector1_real, self.vector1_imag),
                Complex64::new(self.vector2_real, self.vector2_imag),
                Complex64::new(self.vector3_real, self.vector3_imag),
                Complex64::new(self.vector4_real, self.vector4_imag),
                Complex64::new(self.vector5_real, self.vector5_imag),
            ],
        }
    }

    /// Check every value is a finite number
    ///
    /// JSON cannot encode NaN/Inf, but a record written by a buggy or
    /// foreign tool may hold out-of-range values after a lossy edit;
    /// validation happens on load, not on trust.
    pub fn is_finite(&self) -> bool {
        let values = [
            self.energy_real,
            self.energy_imag,
            self.vector0_real,
            self.vector0_imag,
            self.vector1_real,
            self.vector1_imag,
            self.vector2_real,
            self.vector2_imag,
            self.vector3_real,
            self.vector3_imag,
            self.vector4_real,
            self.vector4_imag,
            self.vector5_real,
            self.vector5_imag,
        ];
        values.iter().all(|v| v.is_finite())
    }
}
