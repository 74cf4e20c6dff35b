/*!
 * Process-wide log facility.
 *
 * Call [`init`] once at startup with the `general.log` section of the
 * application [`config::Settings`], then pass the returned handle to whatever
 * needs to log. Records go to stdout and, when configured, to an append-only
 * log file.
 */
pub mod config;
pub mod logging;

pub use logging::{global, init, try_global, Destination, LogFacility, LogLevel, ParseLevelError};
