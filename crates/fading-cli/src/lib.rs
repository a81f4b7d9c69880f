//! # Fading-CLI
//!
//! Command-line front end for the WiFi fading monitor.
//!
//! ```text
//! wifi-fading run --source iw --interface wlan0 --interval 0.5 --export session.csv
//! wifi-fading classify -- -40 -46 -40 -47 -41
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
pub mod config;

pub use crate::config::{AppConfig, SourceKind};

/// WiFi fading detector
#[derive(Debug, Parser)]
#[command(name = "wifi-fading", author, version, about)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Poll an interface and report fading events
    Run(RunArgs),

    /// Classify a fixed sequence of RSSI values
    Classify(ClassifyArgs),

    /// Show version information
    Version,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Signal source
    #[arg(short, long, value_enum)]
    pub source: Option<SourceKind>,

    /// Wireless interface name
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Seconds between polls
    #[arg(long)]
    pub interval: Option<f64>,

    /// Stop after this many seconds (default: until Ctrl-C)
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Seed for the simulated source
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write samples joined with events to this CSV file on exit
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Write the event log as JSON on exit
    #[arg(long)]
    pub events_json: Option<PathBuf>,

    /// Print the narrator prompt for each event
    #[arg(long)]
    pub show_prompt: bool,
}

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// RSSI values in dBm, oldest first
    #[arg(required = true, allow_negative_numbers = true)]
    pub rssi: Vec<i32>,

    /// Channel reported for every sample
    #[arg(long, default_value_t = 6)]
    pub channel: u32,
}
