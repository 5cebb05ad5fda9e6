//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// harmix - harmonic compatibility analysis for DJs
///
/// Reduces each track to a compact tonal fingerprint (a Tonal Interval
/// Vector), caches it next to the music, and scores how well two tracks mix
/// harmonically, including the pitch shift that would maximize the blend.
#[derive(Parser, Debug)]
#[command(name = "harmix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress progress bars)
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze a track or every track in a folder (idempotent per track)
    Analyze {
        /// Input path (audio file or folder of tracks)
        #[arg(short, long, value_name = "PATH")]
        input: PathBuf,
    },

    /// Compare two analyzed tracks
    Compare {
        /// The current (target) track
        track_a: PathBuf,
        /// The candidate track
        track_b: PathBuf,
        /// Simulate pitch-shifting the candidate by this many semitones
        #[arg(short, long, value_name = "SEMITONES", default_value = "0")]
        shift: i32,
    },

    /// Compare one track against every analyzed track in a folder
    Table {
        /// The current (target) track
        current: PathBuf,
        /// Folder of candidates (defaults to the current track's folder)
        #[arg(short, long, value_name = "DIR")]
        input: Option<PathBuf>,
    },
}

impl Cli {
    /// Get the log level based on verbosity flags
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
