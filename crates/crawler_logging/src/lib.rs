#![deny(missing_docs)]
//! Shared logging utilities for the crawler console workspace.
//!
//! This crate provides the `crawler_*` logging macros used by the core, the
//! engine and the console binary, plus a minimal test initializer for the
//! global logger. Callers must depend on the `log` crate themselves since the
//! macros expand to `log::*` invocations.

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! crawler_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! crawler_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! crawler_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! crawler_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Logs a discarded stale reply at debug level with a uniform prefix.
///
/// Stale replies are expected whenever the operator acts faster than the
/// service answers, so they never surface above debug.
#[macro_export]
macro_rules! crawler_stale {
    ($what:expr, $token:expr, $current:expr) => {{
        log::debug!(
            "discarding stale {} reply (token={}, current={})",
            $what,
            $token,
            $current
        );
    }};
}

/// Initializes a simple terminal logger for use in tests.
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
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )]);
}
