//! CLI error types.

use std::fmt;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur while running a scan from the command line.
#[derive(Debug)]
pub enum CliError {
    /// Configuration error.
    Config(String),
    /// Provider error.
    Provider(meetscan_providers::ProviderError),
    /// IO error.
    Io(std::io::Error),
    /// Output serialization error.
    Output(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Provider(err) => write!(f, "provider error: {}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Output(err) => write!(f, "output error: {}", err),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Provider(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Output(err) => Some(err),
            Self::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<meetscan_providers::ProviderError> for CliError {
    fn from(err: meetscan_providers::ProviderError) -> Self {
        Self::Provider(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Output(err)
    }
}
