//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

use crate::state::JsonFileStore;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "chime-timer")]
#[command(about = "A terminal countdown timer with a Westminster-quarters chime")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Countdown duration in minutes (1-180); defaults to the last one used
    #[arg(short, long)]
    pub minutes: Option<f64>,

    /// Path of the settings file
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Mute the completion chime (persisted)
    #[arg(long)]
    pub mute: bool,

    /// Disable completion notifications (persisted)
    #[arg(long)]
    pub no_notifications: bool,

    /// Start counting down immediately
    #[arg(short, long)]
    pub autostart: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Settings file location, honouring `--settings`
    pub fn settings_path(&self) -> PathBuf {
        self.settings.clone().unwrap_or_else(JsonFileStore::default_path)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
