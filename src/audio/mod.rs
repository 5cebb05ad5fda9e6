//! Audio loading and preprocessing

pub mod decoder;

pub use decoder::{centered_excerpt, decode};
