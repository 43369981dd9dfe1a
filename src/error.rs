use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed pagination parameters.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No database connected")]
    NoConnection,

    #[error("failed to open database at {}: {reason}", .path.display())]
    ConnectionFailure { path: PathBuf, reason: String },

    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// The file at `path` must be treated as corrupt.
    #[error("failed to provision sample database at {}: {reason}", .path.display())]
    ProvisionFailure { path: PathBuf, reason: String },

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("background task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn connection(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::ConnectionFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn provision(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::ProvisionFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_connection_message_matches_host_wording() {
        assert_eq!(Error::NoConnection.to_string(), "No database connected");
    }

    #[test]
    fn connection_failure_names_path_and_reason() {
        let err = Error::connection("/tmp/x.db", "file is not a database");
        assert_eq!(
            err.to_string(),
            "failed to open database at /tmp/x.db: file is not a database"
        );
    }
}
