//! Batch orchestration over a music folder

pub mod orchestrator;

pub use orchestrator::{analyze_folder, compare_folder, BatchResult, TableRow};
