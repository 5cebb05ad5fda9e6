//! harmix CLI entry point

use clap::Parser;
use harmix::config::{AnalysisConfig, Cli, Command};
use harmix::pipeline;
use harmix::Session;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli);

    let config = AnalysisConfig::default();
    if let Err(e) = config.validate() {
        eprintln!("Error: invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let session = Session::new(config);

    match &cli.command {
        Command::Analyze { input } => run_analyze(&session, input, !cli.quiet),
        Command::Compare {
            track_a,
            track_b,
            shift,
        } => run_compare(&session, track_a, track_b, *shift),
        Command::Table { current, input } => run_table(&session, current, input.as_deref()),
    }
}

fn init_logging(cli: &Cli) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level())),
        )
        .with_target(false)
        .init();
}

fn run_analyze(session: &Session, input: &Path, show_progress: bool) -> ExitCode {
    match pipeline::analyze_folder(session, input, show_progress) {
        Ok(result) => {
            println!();
            println!(
                "Summary: {} analyzed, {} already analyzed, {} failed (of {} total)",
                result.analyzed,
                result.already_analyzed,
                result.failed(),
                result.total
            );
            for (path, reason) in &result.failures {
                eprintln!("  failed: {}: {}", path.display(), reason);
            }

            if result.failed() > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_compare(session: &Session, track_a: &Path, track_b: &Path, shift: i32) -> ExitCode {
    match session.compare(track_a, track_b, shift) {
        Ok(result) => {
            println!("Compatibility: {:.1}%", result.compatibility);
            println!(
                "Recommended shift: {:+} semitones ({:.1}% compatible)",
                result.best_shift, result.best_compatibility
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_table(session: &Session, current: &Path, input: Option<&Path>) -> ExitCode {
    let folder = match input {
        Some(dir) => dir.to_path_buf(),
        None => match current.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => Path::new(".").to_path_buf(),
        },
    };

    match pipeline::compare_folder(session, current, &folder) {
        Ok(rows) => {
            println!(
                "{:<40} {:>12} {:>8} {:>12}",
                "Track", "Compat %", "Shift", "Best %"
            );
            for row in &rows {
                println!(
                    "{:<40} {:>12.1} {:>+8} {:>12.1}",
                    row.name, row.compatibility, row.best_shift, row.best_compatibility
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
