//! Global error handling for davbrowse
//!
//! This module provides a centralized error type that can represent errors
//! from all modules in the project.

use std::io;
use thiserror::Error;

/// Message used for every asset lookup failure, so callers cannot tell a
/// missing file apart from a rejected one.
pub const ASSET_NOT_FOUND: &str = "Path does not exist, or escaping from the base path was detected";

/// Global error type for davbrowse operations
#[derive(Error, Debug)]
pub enum BrowserError {
    /// Node or asset could not be resolved
    #[error("Not found: {0}")]
    NotFound(String),

    /// POST body with a content type the browser does not accept
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Required form field missing or blank; the action is skipped
    #[error("Skipped: {0}")]
    ValidationSkip(String),

    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON processing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl BrowserError {
    /// The error raised for any asset that cannot be served
    pub fn asset_not_found() -> Self {
        BrowserError::NotFound(ASSET_NOT_FOUND.to_string())
    }

    /// Whether this error means the requested thing does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            BrowserError::NotFound(_) => true,
            BrowserError::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Specialized Result type for davbrowse operations
pub type Result<T> = std::result::Result<T, BrowserError>;

/// Creates a BrowserError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::BrowserError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}

// The CLI entry point works in io::Result
impl From<BrowserError> for io::Error {
    fn from(err: BrowserError) -> Self {
        let kind = if err.is_not_found() {
            io::ErrorKind::NotFound
        } else {
            io::ErrorKind::Other
        };
        io::Error::new(kind, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checked(value: &str) -> Result<&str> {
        ensure!(!value.trim().is_empty(), ValidationSkip, "blank field");
        Ok(value)
    }

    #[test]
    fn test_ensure_macro() {
        assert!(checked("name").is_ok());
        assert!(matches!(checked("  "), Err(BrowserError::ValidationSkip(_))));
    }

    #[test]
    fn test_asset_not_found_hides_details() {
        let err = BrowserError::asset_not_found();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), format!("Not found: {}", ASSET_NOT_FOUND));
    }

    #[test]
    fn test_io_not_found_is_not_found() {
        let err: BrowserError = io::Error::from(io::ErrorKind::NotFound).into();
        assert!(err.is_not_found());
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
    }
}
