//! Logger initialization and the log macros used across the workspace.
//!
//! The macros delegate to the `log` facade, so they pick up whatever backend
//! the process installed. [`init_logger`] wires the default log4rs console
//! appender used by the node binary and by integration tests.

use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};

pub const LOG_LINE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{({l}):5.5}] {m}{n}";

/// Initializes a console logger at the given level filter.
///
/// Calling this twice is a no-op (the second `log4rs` install fails and is
/// ignored), which keeps it safe to call from multiple test entry points.
pub fn init_logger(level: LevelFilter) {
    let stdout = ConsoleAppender::builder().encoder(Box::new(PatternEncoder::new(LOG_LINE_PATTERN))).build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(level));
    if let Ok(config) = config {
        let _ = log4rs::init_config(config);
    }
}

#[macro_export]
macro_rules! trace {
    ($($t:tt)*) => (::log::trace!($($t)*))
}

#[macro_export]
macro_rules! debug {
    ($($t:tt)*) => (::log::debug!($($t)*))
}

#[macro_export]
macro_rules! info {
    ($($t:tt)*) => (::log::info!($($t)*))
}

#[macro_export]
macro_rules! warn {
    ($($t:tt)*) => (::log::warn!($($t)*))
}

#[macro_export]
macro_rules! error {
    ($($t:tt)*) => (::log::error!($($t)*))
}
