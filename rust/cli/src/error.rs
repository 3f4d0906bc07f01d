//! Error types for the CLI application.
//!
//! Engine failures, configuration problems and I/O errors all funnel into
//! [`CliError`] so command handlers can use `?` throughout.
//!
//! ## Batch Validation Errors
//!
//! `BatchValidationError<T>` collects per-record failures with context. The
//! verify command uses it to report every violation found in a hand log
//! instead of stopping at the first one.

use std::fmt;

use potsettle_engine::errors::EngineError;

use crate::config::ConfigError;

/// Custom error type for CLI operations.
#[derive(Debug)]
pub enum CliError {
    /// I/O error (file operations, stdout/stderr writes, etc.)
    Io(std::io::Error),

    /// Unreadable hand file or bad command-line arguments
    InvalidInput(String),

    /// Configuration error
    Config(String),

    /// The engine refused the hand
    Engine(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "I/O error: {}", e),
            CliError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Engine(msg) => write!(f, "Engine error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(error: std::io::Error) -> Self {
        CliError::Io(error)
    }
}

impl From<EngineError> for CliError {
    fn from(error: EngineError) -> Self {
        CliError::Engine(error.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        CliError::Config(error.to_string())
    }
}

// read_text_auto and ensure_parent_dir report plain strings
impl From<String> for CliError {
    fn from(error: String) -> Self {
        CliError::InvalidInput(error)
    }
}

/// Generic error type for batch validation operations.
///
/// # Type Parameters
///
/// * `T` - Context identifying the failed item (a record index, a hand id,
///   a file path). Must implement `Display` for error formatting.
///
/// # Examples
///
/// ```rust
/// use potsettle_cli::BatchValidationError;
///
/// let error = BatchValidationError {
///     item_context: 5,
///     message: "pots total 10 but contributions total 12".to_string(),
/// };
/// assert_eq!(error.to_string(), "5: pots total 10 but contributions total 12");
/// ```
#[derive(Debug)]
pub struct BatchValidationError<T> {
    /// Context identifying the item that failed validation
    pub item_context: T,
    /// Descriptive error message
    pub message: String,
}

impl<T: fmt::Display> fmt::Display for BatchValidationError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.item_context, self.message)
    }
}
