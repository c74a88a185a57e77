#![deny(missing_docs)]
//! Shared logging utilities for the scout workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! a process-wide batch position that the macros prefix to every message while
//! a batch run is active, and a minimal test initializer for the global logger.

use std::sync::Mutex;

#[doc(hidden)]
pub use log;

/// Position of the item currently being processed by the active batch run.
static BATCH_POSITION: Mutex<Option<(usize, usize)>> = Mutex::new(None);

/// Records that item `index` (1-based) of `total` is being processed.
/// The batch runner calls this before every item.
pub fn set_batch_position(index: usize, total: usize) {
    if let Ok(mut guard) = BATCH_POSITION.lock() {
        *guard = Some((index, total));
    }
}

/// Clears the batch position once a run has ended.
pub fn clear_batch_position() {
    if let Ok(mut guard) = BATCH_POSITION.lock() {
        *guard = None;
    }
}

/// Retrieves the current batch position, if a run is active.
pub fn batch_position() -> Option<(usize, usize)> {
    BATCH_POSITION.lock().ok().and_then(|guard| *guard)
}

/// Prefix prepended to log lines: `[i/n] ` during a batch run, empty otherwise.
#[doc(hidden)]
pub fn position_prefix() -> String {
    match batch_position() {
        Some((index, total)) => format!("[{index}/{total}] "),
        None => String::new(),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("{}{}", $crate::position_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("{}{}", $crate::position_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("{}{}", $crate::position_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("{}{}", $crate::position_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("{}{}", $crate::position_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
