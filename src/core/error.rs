//! Error types for gitlab-archive-dl
//!
//! One error enum covers discovery, transfer, retry bookkeeping and
//! configuration. Callers decide per phase whether an error is fatal.

use std::fmt;
use std::path::PathBuf;

/// Main error type for gitlab-archive-dl operations
#[derive(Debug)]
pub enum Error {
    /// Non-success HTTP status or network failure
    Transport { url: String, reason: String },

    /// Response body did not decode into the expected record
    Decode(String),

    /// Local filesystem failure while materializing an archive
    Write { path: PathBuf, source: std::io::Error },

    /// A failed item could not be matched back to its group path
    Lookup(String),

    /// Invalid configuration or parameters
    InvalidInput(String),

    /// Other file I/O error
    IoError(std::io::Error),
}

impl Error {
    /// Build a transport error for a non-success status
    pub fn status(url: &str, status: reqwest::StatusCode) -> Self {
        Error::Transport {
            url: url.to_string(),
            reason: format!("HTTP {status}"),
        }
    }

    /// Build a transport error from a reqwest failure, keeping the URL
    pub fn network(url: &str, err: reqwest::Error) -> Self {
        Error::Transport {
            url: url.to_string(),
            reason: err.without_url().to_string(),
        }
    }

    /// Whether this is a transport-level failure
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport { url, reason } => {
                write!(f, "Transport error for {}: {}", url, reason)
            }
            Error::Decode(msg) => {
                write!(f, "Decode error: {}", msg)
            }
            Error::Write { path, source } => {
                write!(f, "Write error for {}: {}", path.display(), source)
            }
            Error::Lookup(msg) => {
                write!(f, "Lookup error: {}", msg)
            }
            Error::InvalidInput(msg) => {
                write!(f, "Invalid input: {}", msg)
            }
            Error::IoError(err) => {
                write!(f, "I/O error: {}", err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Write { source, .. } => Some(source),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::IoError(err.into())
    }
}

/// Convenience result type for gitlab-archive-dl operations
pub type Result<T> = std::result::Result<T, Error>;
