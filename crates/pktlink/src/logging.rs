//! `tracing` subscriber setup for demo and host binaries.
//!
//! The library crates only emit events; installing a subscriber is left to
//! whoever owns `main`.

use clap::{Args, ValueEnum};
use tracing::level_filters::LevelFilter;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Logging flags to flatten into a binary's argument parser.
///
/// Each flag can also be set through its environment variable.
#[derive(Args, Copy, Clone, Debug)]
pub struct LogArgs {
    /// Log output format (stderr).
    #[arg(
        long,
        value_name = "FORMAT",
        env = "PKTLINK_LOG_FORMAT",
        default_value = "text",
        ignore_case = true
    )]
    pub log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        env = "PKTLINK_LOG",
        default_value = "info",
        ignore_case = true
    )]
    pub log_level: LogLevel,
}

impl LogArgs {
    /// Install the subscriber these flags describe.
    pub fn init(&self) {
        init_logging(self.log_format, self.log_level);
    }
}

/// Install a stderr subscriber. A second call is a no-op.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.as_filter())
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}
