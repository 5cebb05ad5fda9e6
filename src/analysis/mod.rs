//! Tonal analysis: chroma estimation, the TIV representation, and
//! compatibility scoring

pub mod chroma;
pub mod compatibility;
pub mod tiv;

pub use compatibility::{best_shift, compatibility, scale};
pub use tiv::Tiv;
