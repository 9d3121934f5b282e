//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::config::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// FleetDispatch - concurrent delivery dispatcher
///
/// Sends every task of a fleet file to its transport agent (truck, drone
/// or boat) at the same time and reports one outcome per task.
///
/// Examples:
///   fleetdispatch
///   fleetdispatch --config fleet.toml --format markdown --output report.md
///   fleetdispatch --time-scale 0 --format json
///   fleetdispatch --dry-run
///   fleetdispatch --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the fleet configuration file
    ///
    /// If not specified, looks for .fleetdispatch.toml in the current
    /// directory and falls back to the built-in demo fleet
    #[arg(short, long, value_name = "FILE", env = "FLEETDISPATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (text, markdown, json)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Multiply every simulated transit time by this factor
    ///
    /// Use 0 to make all deliveries instant.
    #[arg(long, value_name = "FACTOR")]
    pub time_scale: Option<f64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Do not show a progress bar while tasks run
    #[arg(long)]
    pub no_progress: bool,

    /// Print the fleet status and planned tasks without dispatching
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with code 2 when any delivery failed
    #[arg(long)]
    pub fail_on_failure: bool,

    /// Generate a default .fleetdispatch.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(scale) = self.time_scale {
            if !scale.is_finite() || scale < 0.0 {
                return Err("Time scale must be a non-negative number".to_string());
            }
        }

        if let Some(ref config) = self.config {
            if !config.is_file() {
                return Err(format!("Config file does not exist: {}", config.display()));
            }
        }

        Ok(())
    }

    /// Whether the progress bar should be drawn.
    pub fn show_progress(&self) -> bool {
        !self.no_progress && !self.quiet
    }
}
