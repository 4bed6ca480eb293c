//! Error types for zipgate

use std::path::{Path, PathBuf};

/// Result type alias using [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for zipgate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A path exclusion declared an expression type other than `string` or `regex`
    #[error("Configuration error: unknown path expression type '{0}' (expected 'string' or 'regex')")]
    UnknownExpressionType(String),

    /// A regex path exclusion failed to compile
    #[error("Configuration error: invalid path pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Pattern source text
        pattern: String,
        /// Compilation failure
        #[source]
        source: regex::Error,
    },

    /// A configuration file could not be read
    #[error("Failed to read config file {}: {source}", path.display())]
    Io {
        /// File that failed to read
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error must abort configuration loading.
    ///
    /// Every current variant does; the method exists so loaders can
    /// classify without matching on the variants.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Config(_)
                | Error::UnknownExpressionType(_)
                | Error::InvalidPattern { .. }
                | Error::Io { .. }
                | Error::Serialization(_)
        )
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Error::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a file read error
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
