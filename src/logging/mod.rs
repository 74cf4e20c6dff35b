/**
 * Initializes the process logger
 *
 * https://docs.rs/slog/latest/slog/
 *
 * The facility is a thin layer over slog: it decides, once, which drains
 * exist (stdout always, a log file when configured) and which threshold gates
 * them, then forwards leveled records. Setup problems never fail the caller,
 * they are reported as diagnostics and the facility degrades to console only.
 */
use std::fmt;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use slog::{o, Drain, Duplicate, Logger};
use slog_async::{Async, AsyncGuard, OverflowStrategy};

use crate::config::LogSettings;

mod drains;
mod error;
pub mod level;
mod macros;

pub use level::{LogLevel, ParseLevelError};

use drains::BoxedDrain;

/// The process-wide facility, installed by the first `init` or `global` call.
static FACILITY: OnceLock<Arc<LogFacility>> = OnceLock::new();

/**
 * A place records are written to.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Console,
    File(PathBuf),
}

#[derive(Debug)]
struct FileDestination {
    path: PathBuf,
    level: LogLevel,
}

/**
 * A configured logging handle.
 *
 * Built once per process through [`init`], then shared as `Arc<LogFacility>`
 * with every component that logs. [`LogFacility::new`] builds a standalone
 * handle that is not installed process-wide.
 */
pub struct LogFacility {
    logger: Logger,
    screen_level: LogLevel,
    effective_level: LogLevel,
    file: Option<FileDestination>,
    diagnostics: Vec<String>,
    async_guard: Mutex<Option<AsyncGuard>>,
}

/**
 * Initializes the process logger from the log settings.
 *
 * Only the first call in the process builds a facility; every later call,
 * whatever its settings, returns that same handle. Concurrent first callers
 * block until the one initialization running has finished.
 *
 * @param settings The resolved `general.log` configuration section.
 * @return The process-wide facility.
 */
pub fn init(settings: &LogSettings) -> Arc<LogFacility> {
    Arc::clone(FACILITY.get_or_init(|| Arc::new(LogFacility::new(settings))))
}

/**
 * Returns the process-wide facility.
 *
 * Emitting before `init` is not an error: the facility is then created with
 * the default settings (console at info, no file) and a diagnostic says so.
 * A later `init` call is a no-op, as any second initialization is.
 */
pub fn global() -> Arc<LogFacility> {
    Arc::clone(FACILITY.get_or_init(|| {
        let mut diagnostics = Vec::new();
        report(
            &mut diagnostics,
            "Logger used before initialization, using default settings".to_string(),
        );
        Arc::new(LogFacility::build(&LogSettings::default(), diagnostics))
    }))
}

/// Returns the process-wide facility if one has been installed.
pub fn try_global() -> Option<Arc<LogFacility>> {
    FACILITY.get().cloned()
}

fn report(diagnostics: &mut Vec<String>, message: String) {
    eprintln!("{message}");
    diagnostics.push(message);
}

/**
 * Parses a configured level, substituting `default` with a diagnostic when
 * the string is not a level name.
 */
fn resolve_level(
    destination: &str,
    raw: &str,
    default: LogLevel,
    diagnostics: &mut Vec<String>,
) -> LogLevel {
    match raw.parse::<LogLevel>() {
        Ok(level) => level,
        Err(e) => {
            report(
                diagnostics,
                format!("Invalid {destination} log level '{raw}', defaulting to {default}: {e}"),
            );
            default
        }
    }
}

impl LogFacility {
    /**
     * Builds a facility without installing it process-wide.
     *
     * @param settings The log settings to apply.
     * @return A ready handle; setup problems are listed in `diagnostics()`.
     */
    pub fn new(settings: &LogSettings) -> Self {
        Self::build(settings, Vec::new())
    }

    fn build(settings: &LogSettings, mut diagnostics: Vec<String>) -> Self {
        let screen_level =
            resolve_level("screen", &settings.screen_level, LogLevel::Info, &mut diagnostics);
        let console = drains::console_drain();

        let mut file = None;
        let drain: BoxedDrain = if settings.file_path.is_empty() {
            console
        } else {
            let file_level =
                resolve_level("file", &settings.file_level, LogLevel::Debug, &mut diagnostics);
            let path = PathBuf::from(&settings.file_path);
            match drains::open_log_file(&path) {
                Ok(handle) => {
                    let mut console = console;
                    let mut file_drain = drains::file_drain(handle);
                    if settings.independent_levels {
                        console = drains::filtered(console, screen_level);
                        file_drain = drains::filtered(file_drain, file_level);
                    }
                    file = Some(FileDestination {
                        path,
                        level: file_level,
                    });
                    let both: BoxedDrain = Box::new(Duplicate::new(console, file_drain).ignore_res());
                    both
                }
                Err(e) => {
                    report(&mut diagnostics, e.to_string());
                    console
                }
            }
        };

        let effective_level = file
            .as_ref()
            .map_or(screen_level, |f| screen_level.min(f.level));
        let drain = drains::filtered(drain, effective_level);

        let (drain, async_guard) = if settings.async_output {
            let (drain, guard) = Async::new(drain)
                .overflow_strategy(OverflowStrategy::Block)
                .build_with_guard();
            let drain: BoxedDrain = Box::new(drain.ignore_res());
            (drain, Some(guard))
        } else {
            (drain, None)
        };

        let logger = Logger::root(drains::SharedDrain::new(drain), o!());
        slog::debug!(logger, "logging initialized";
            "screen_level" => screen_level.as_str(),
            "effective_level" => effective_level.as_str(),
            "file" => file.as_ref().map_or_else(|| "none".to_string(), |f| f.path.display().to_string()),
            "async" => settings.async_output
        );

        Self {
            logger,
            screen_level,
            effective_level,
            file,
            diagnostics,
            async_guard: Mutex::new(async_guard),
        }
    }

    /**
     * Whether a record at `level` passes the facility-wide threshold.
     * Fatal is always enabled.
     */
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.effective_level
    }

    /// The threshold gating every destination before formatting.
    pub fn effective_level(&self) -> LogLevel {
        self.effective_level
    }

    pub fn screen_level(&self) -> LogLevel {
        self.screen_level
    }

    /// Path and level of the file destination, if it was set up.
    pub fn file_destination(&self) -> Option<(&Path, LogLevel)> {
        self.file.as_ref().map(|f| (f.path.as_path(), f.level))
    }

    pub fn destinations(&self) -> Vec<Destination> {
        let mut destinations = vec![Destination::Console];
        if let Some(file) = &self.file {
            destinations.push(Destination::File(file.path.clone()));
        }
        destinations
    }

    /// Messages reported while the facility was being set up.
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /**
     * The underlying slog logger, for call sites that want child loggers
     * with their own key/value context.
     */
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    fn emit(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        match level {
            LogLevel::Debug => slog::debug!(self.logger, "{}", args),
            LogLevel::Info => slog::info!(self.logger, "{}", args),
            LogLevel::Warn => slog::warn!(self.logger, "{}", args),
            LogLevel::Error => slog::error!(self.logger, "{}", args),
            LogLevel::Fatal => slog::crit!(self.logger, "{}", args; "severity" => "fatal"),
        }
    }

    /**
     * Emits `args` at `level` when the level is enabled.
     * Fatal records go through here without terminating the process.
     */
    pub fn log(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if self.is_enabled(level) {
            self.emit(level, args);
        }
    }

    pub fn debug(&self, msg: impl fmt::Display) {
        self.log(LogLevel::Debug, format_args!("{msg}"));
    }

    pub fn info(&self, msg: impl fmt::Display) {
        self.log(LogLevel::Info, format_args!("{msg}"));
    }

    pub fn warn(&self, msg: impl fmt::Display) {
        self.log(LogLevel::Warn, format_args!("{msg}"));
    }

    pub fn error(&self, msg: impl fmt::Display) {
        self.log(LogLevel::Error, format_args!("{msg}"));
    }

    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Debug, args);
    }

    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    pub fn warnf(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }

    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }

    /**
     * Emits `msg` regardless of the configured levels, then exits the
     * process with status 1.
     */
    pub fn fatal(&self, msg: impl fmt::Display) -> ! {
        self.fatalf(format_args!("{msg}"))
    }

    pub fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.emit(LogLevel::Fatal, args);
        self.shutdown();
        process::exit(1)
    }

    /**
     * Flushes and stops the async writer thread.
     *
     * Records emitted afterwards on an async facility are dropped. Direct
     * facilities write synchronously and are not affected.
     */
    pub fn shutdown(&self) {
        let guard = self
            .async_guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(guard);
    }
}

impl fmt::Debug for LogFacility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogFacility")
            .field("screen_level", &self.screen_level)
            .field("effective_level", &self.effective_level)
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}
