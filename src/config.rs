//! Configuration management for the merge tool.
//!
//! Handles:
//! - Command-line argument parsing
//! - Profile directory configuration
//! - Run-log path defaulting

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the merge tool
#[derive(Debug, Parser)]
#[command(name = "gcode-merge")]
#[command(about = "Merge per-operation CNC programs into per-setup, per-tool programs")]
#[command(version)]
pub struct Args {
    /// Working directory holding the source program files
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Feed rate override
    #[arg(long, help = "Replace every F word in the output with this feed rate")]
    pub feed: Option<f64>,

    /// Output line filter
    #[arg(
        long,
        help = "Space-separated tags; only lines carrying all of them are emitted"
    )]
    pub filter: Option<String>,

    /// Explicit post profile file
    #[arg(long, help = "Post profile TOML file")]
    pub profile: Option<PathBuf>,

    /// Source file extension override
    #[arg(long, help = "Source file extension (defaults to the profile's)")]
    pub extension: Option<String>,

    /// Run log location
    #[arg(long, help = "Run log path (defaults to gcode-merge.log in the working directory)")]
    pub log_file: Option<PathBuf>,

    /// Log level for diagnostics on stderr
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory scanned for source programs and receiving the output
    pub working_dir: PathBuf,
    /// Feed rate substituted into every output F word, when set
    pub feed_override: Option<f64>,
    /// Tags a line must carry to be emitted; empty means no filtering
    pub filter_tags: Vec<String>,
    /// Profile file explicitly requested on the command line
    pub profile_path: Option<PathBuf>,
    /// Directories searched for a default profile
    pub profile_dirs: Vec<PathBuf>,
    /// Source extension override
    pub extension: Option<String>,
    /// Run log path
    pub log_file: PathBuf,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        let filter_tags = args
            .filter
            .as_deref()
            .map(|raw| raw.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        let log_file = args
            .log_file
            .unwrap_or_else(|| args.dir.join("gcode-merge.log"));

        // Default user config directory
        let mut profile_dirs = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            profile_dirs.push(config_dir.join("gcode-merge").join("profiles"));
        }

        Ok(Config {
            working_dir: args.dir,
            feed_override: args.feed,
            filter_tags,
            profile_path: args.profile,
            profile_dirs,
            extension: args.extension,
            log_file,
            log_level: args.log_level,
        })
    }
}
