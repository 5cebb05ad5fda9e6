//! CLI argument parsing and analysis configuration

pub mod cli;
pub mod settings;

pub use cli::{Cli, Command};
pub use settings::AnalysisConfig;
