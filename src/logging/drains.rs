/**
 * Writers behind the facility: a console drain on stdout and an optional
 * append-only file drain, both rendered with slog-term's full format.
 *
 * https://docs.rs/slog-term/latest/slog_term/
 */
use std::fs::{DirBuilder, File, OpenOptions};
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use slog::{Drain, Level, LevelFilter, Never, OwnedKVList, Record};
use slog_term::{FullFormat, PlainSyncDecorator, TermDecorator};

use super::error::LogSetupError;
use super::level::LogLevel;

pub(crate) type BoxedDrain = Box<dyn Drain<Ok = (), Err = Never> + Send>;

/// `2026-10-16T09:30:00.123+02:00`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

fn timestamp_full(io: &mut dyn io::Write) -> io::Result<()> {
    write!(io, "{}", chrono::Local::now().format(TIMESTAMP_FORMAT))
}

/**
 * Builds the stdout drain.
 *
 * A terminal gets the colored `TermDecorator`, anything else (pipes, files,
 * test harnesses) gets plain text. Write errors are dropped, a broken stdout
 * must not take the host application down.
 */
pub(crate) fn console_drain() -> BoxedDrain {
    let stdout = io::stdout();
    if stdout.is_terminal() {
        let decorator = TermDecorator::new().stdout().build();
        let drain = FullFormat::new(decorator)
            .use_custom_timestamp(timestamp_full)
            .build();
        Box::new(drain.ignore_res())
    } else {
        let decorator = PlainSyncDecorator::new(stdout);
        let drain = FullFormat::new(decorator)
            .use_custom_timestamp(timestamp_full)
            .build();
        Box::new(drain.ignore_res())
    }
}

/**
 * Builds a plain text drain appending to an already opened log file.
 */
pub(crate) fn file_drain(file: File) -> BoxedDrain {
    let decorator = PlainSyncDecorator::new(file);
    let drain = FullFormat::new(decorator)
        .use_custom_timestamp(timestamp_full)
        .build();
    Box::new(drain.ignore_res())
}

/**
 * Wraps a drain so that only records at or above `level` go through.
 */
pub(crate) fn filtered(drain: BoxedDrain, level: LogLevel) -> BoxedDrain {
    Box::new(LevelFilter::new(drain, level.to_slog()).ignore_res())
}

/**
 * Serializes access to the drain chain for every thread of the process.
 *
 * A panic while a record is being formatted (a caller's `Display` impl, for
 * instance) poisons the lock. Later records take the lock regardless, so
 * one bad argument does not silence or crash all later logging.
 */
pub(crate) struct SharedDrain(Mutex<BoxedDrain>);

impl SharedDrain {
    pub(crate) fn new(drain: BoxedDrain) -> Self {
        Self(Mutex::new(drain))
    }
}

impl Drain for SharedDrain {
    type Ok = ();
    type Err = Never;

    fn log(&self, record: &Record, values: &OwnedKVList) -> Result<(), Never> {
        let drain = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        drain.log(record, values)
    }

    fn is_enabled(&self, level: Level) -> bool {
        let drain = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        drain.is_enabled(level)
    }
}

/**
 * Opens (creating if needed) the log file in append mode.
 *
 * Missing parent directories are created first. A path without a directory
 * component is opened relative to the working directory.
 *
 * @param path The configured log file path.
 * @return The open file handle, or the step that failed.
 */
pub(crate) fn open_log_file(path: &Path) -> Result<File, LogSetupError> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        create_log_dir(dir).map_err(|source| LogSetupError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o666);
    }
    options.open(path).map_err(|source| LogSetupError::OpenFile {
        path: path.to_path_buf(),
        source,
    })
}

fn create_log_dir(dir: &Path) -> io::Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(dir)
}
