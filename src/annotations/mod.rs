//! Per-track annotation cache (the persisted TIV)

pub mod record;
pub mod store;

pub use record::AnnotationRecord;
pub use store::{AnnotationStore, FsAnnotationStore};
