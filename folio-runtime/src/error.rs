use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the watcher runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    #[error("ctrl-c handler failed: {0}")]
    Signal(#[source] std::io::Error),

    #[error("config path has no parent directory: {0}")]
    NoParent(PathBuf),
}
