/**
 * Severity levels understood by the log facility.
 *
 * The order is total: Debug < Info < Warn < Error < Fatal. Thresholds are
 * compared with it, a record passes when its level is >= the threshold.
 */
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// Returned when a level string matches none of the accepted spellings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a valid log level: {input:?} (expected debug, info, warn, error or fatal)")]
pub struct ParseLevelError {
    pub input: String,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    /**
     * Returns the canonical lowercase name of the level.
     */
    pub fn as_str(&self) -> &'static str {
        match *self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    /**
     * Maps the level onto the slog severity used by the drains.
     * Fatal records are written as slog `Critical`.
     */
    pub fn to_slog(self) -> slog::Level {
        match self {
            LogLevel::Debug => slog::Level::Debug,
            LogLevel::Info => slog::Level::Info,
            LogLevel::Warn => slog::Level::Warning,
            LogLevel::Error => slog::Level::Error,
            LogLevel::Fatal => slog::Level::Critical,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    /**
     * Parse a level name, ignoring case and surrounding whitespace.
     */
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "fatal" => Ok(LogLevel::Fatal),
            _ => Err(ParseLevelError {
                input: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
