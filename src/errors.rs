//! Shared error types for bddsniff
//!
//! Parsing never produces an error: malformed feature or step definition text
//! degrades to empty fields that the rule engine then flags. Errors are
//! reserved for things the caller has to fix before an evaluation pass can
//! mean anything, mostly configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for bddsniff operations
#[derive(Debug, Error)]
pub enum Error {
    /// Rule table or configuration file problems
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A pattern that had to compile (rule words, configured expressions) did not
    #[error("Invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// File system related errors, raised only by the binary's loaders
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a file system error with path context
    pub fn file_system(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source),
        }
    }

    /// Whether the error came from the rule table or configuration file
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let err = Error::configuration("no enabled rules");
        assert_eq!(err.to_string(), "Configuration error: no enabled rules");
        assert!(err.is_configuration());
    }

    #[test]
    fn test_file_system_error_keeps_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = Error::file_system("Failed to read feature", "features/a.feature", io);
        match err {
            Error::FileSystem { path, source, .. } => {
                assert_eq!(path, Some(PathBuf::from("features/a.feature")));
                assert!(source.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_file_system_error_is_not_configuration() {
        let io = std::io::Error::other("boom");
        let err = Error::file_system("Failed to read config file", ".bddsniff.toml", io);
        assert!(!err.is_configuration());
        assert_eq!(err.to_string(), "File system error: Failed to read config file");
    }
}
