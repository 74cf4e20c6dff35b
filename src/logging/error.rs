use std::io;
use std::path::PathBuf;

use thiserror::Error;

/**
 * Failures while preparing the file destination.
 *
 * None of these reach the caller of `init`: they are rendered into a
 * startup diagnostic and the facility continues with the console only.
 */
#[derive(Debug, Error)]
pub(crate) enum LogSetupError {
    #[error("Failed to create log directory '{}': {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to open log file '{}': {source}", path.display())]
    OpenFile { path: PathBuf, source: io::Error },
}
