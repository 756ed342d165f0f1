//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Default configuration file, optional when not given explicitly.
pub const DEFAULT_CONFIG_PATH: &str = "sridm.toml";

/// sridm -- Nokia SR OS IPsec debug output analyzer.
///
/// Extracts debug messages, correlates IKEv2 IDi with tunnel endpoints and
/// reproduces only the messages of tunnels whose IDi matches a pattern.
#[derive(Parser, Debug)]
#[command(name = "sridm", version, about, long_about = None)]
pub struct Cli {
    /// Path to the sridm.toml configuration file.
    ///
    /// When omitted, ./sridm.toml is used if it exists.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(flatten)]
    pub matching: MatchArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

/// IDi matching and report selection flags, shared by every analysis command.
#[derive(Args, Debug, Default)]
pub struct MatchArgs {
    /// RE pattern of IDi to match (default from config: ".").
    #[arg(short = 'd', long = "idi", global = true)]
    pub idi_pattern: Option<String>,

    /// Show remote tunnel endpoints of tunnels with matched IDi (`-e=false` to hide).
    #[arg(short = 'e', long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub show_eps: Option<bool>,

    /// Show debug messages of tunnels with matched IDi.
    #[arg(short = 'm', long, global = true, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    pub show_msgs: Option<bool>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read SR OS IPsec debug output from a file.
    File(FileArgs),

    /// Replay a recorded live-feed session of decoded log events.
    Feed(FeedArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- file ----

/// Analyze a saved debug capture.
#[derive(Args, Debug)]
pub struct FileArgs {
    /// SR OS debug IPsec output file.
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
}

// ---- feed ----

/// Replay decoded `sros-log-generic-event` notifications (one JSON object per line).
#[derive(Args, Debug)]
pub struct FeedArgs {
    /// Recording of decoded events, one JSON object per line.
    pub recording: PathBuf,

    /// Router address and management port the recording came from, e.g. 192.168.1.1:830.
    #[arg(short = 'r', long)]
    pub router: Option<String>,

    /// Notification stream name the recording was subscribed to.
    #[arg(short = 's', long)]
    pub stream: Option<String>,
}

// ---- config ----

/// Manage sridm configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, analyzer, feed).
        #[arg(long)]
        section: Option<String>,
    },
}
