//! Logger setup for the `scout` binary.
//!
//! Terminal output goes to stderr; stdout is reserved for the JSON results.
//! The log file is `scout.log` in the scout home directory.

use std::fs::File;
use std::path::Path;

use clap::ValueEnum;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

pub const LOG_FILENAME: &str = "scout.log";
pub const LEVEL_VAR: &str = "SCOUT_LOG";

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogDestination {
    /// Write to scout.log only.
    File,
    /// Write to the terminal (stderr) only.
    Terminal,
    /// Write to both file and terminal.
    Both,
}

/// Installs the global logger. The level comes from `SCOUT_LOG`
/// (`error`, `warn`, `info`, `debug`, `trace`), `info` when unset or invalid.
pub fn initialize(destination: LogDestination, log_dir: &Path) {
    let level = level_from(std::env::var(LEVEL_VAR).ok().as_deref());
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::File => match create_file_logger(level, config, log_dir) {
            Some(file_logger) => vec![file_logger],
            None => return,
        },
        LogDestination::Terminal => vec![term_logger(level, config)],
        LogDestination::Both => {
            let mut loggers = vec![term_logger(level, config.clone())];
            if let Some(file_logger) = create_file_logger(level, config, log_dir) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

fn level_from(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn term_logger(level: LevelFilter, config: Config) -> Box<dyn SharedLogger> {
    TermLogger::new(level, config, TerminalMode::Stderr, ColorChoice::Auto)
}

fn create_file_logger(level: LevelFilter, config: Config, log_dir: &Path) -> Option<Box<dyn SharedLogger>> {
    let log_path = log_dir.join(LOG_FILENAME);
    match File::create(&log_path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}
