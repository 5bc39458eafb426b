//! Google Calendar provider configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ProviderError, ProviderResult};

/// Environment variable naming the credentials file.
pub const CREDENTIALS_ENV: &str = "GCSA_CREDENTIALS";

/// Configuration for the Google Calendar provider.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Path to the credentials file holding the access token.
    pub credentials_path: PathBuf,

    /// Request timeout.
    pub timeout: Duration,
}

impl GoogleConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a configuration with an explicit credentials path.
    pub fn new(credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Resolves the credentials path from an optional override.
    ///
    /// Precedence: explicit path, then `$GCSA_CREDENTIALS`, then
    /// `<user config dir>/gcsa/credentials.json`.
    pub fn resolve_credentials_path(explicit: Option<PathBuf>) -> PathBuf {
        if let Some(path) = explicit {
            return path;
        }
        if let Some(path) = std::env::var_os(CREDENTIALS_ENV) {
            return PathBuf::from(path);
        }
        default_credentials_path()
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// The default credentials location under the user's config directory.
fn default_credentials_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gcsa")
        .join("credentials.json")
}

/// Stored credentials: a ready access token for the Calendar API.
///
/// Obtaining and refreshing tokens is the user's concern; the scanner only
/// consumes a token that already works.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleCredentials {
    /// The OAuth 2.0 access token.
    #[serde(alias = "token")]
    pub access_token: String,
}

impl GoogleCredentials {
    /// Loads credentials from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parses credentials from a JSON string.
    pub fn from_json(json: &str) -> ProviderResult<Self> {
        let creds: Self = serde_json::from_str(json).map_err(|e| {
            ProviderError::configuration(format!("failed to parse credentials JSON: {}", e))
        })?;
        if creds.access_token.is_empty() {
            return Err(ProviderError::configuration(
                "credentials file contains an empty access token",
            ));
        }
        Ok(creds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn explicit_path_wins() {
        let path = GoogleConfig::resolve_credentials_path(Some(PathBuf::from("/tmp/creds.json")));
        assert_eq!(path, PathBuf::from("/tmp/creds.json"));
    }

    #[test]
    fn default_path_ends_with_gcsa_credentials() {
        let path = default_credentials_path();
        assert!(path.ends_with("gcsa/credentials.json"));
    }

    #[test]
    fn parses_access_token() {
        let creds = GoogleCredentials::from_json(r#"{"access_token": "ya29.abc"}"#).unwrap();
        assert_eq!(creds.access_token, "ya29.abc");
    }

    #[test]
    fn accepts_token_alias() {
        let creds = GoogleCredentials::from_json(r#"{"token": "ya29.xyz"}"#).unwrap();
        assert_eq!(creds.access_token, "ya29.xyz");
    }

    #[test]
    fn rejects_empty_token() {
        assert!(GoogleCredentials::from_json(r#"{"access_token": ""}"#).is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(GoogleCredentials::from_json("not json").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"access_token": "ya29.file"}}"#).unwrap();

        let creds = GoogleCredentials::from_file(file.path()).unwrap();
        assert_eq!(creds.access_token, "ya29.file");
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let err = GoogleCredentials::from_file("/nonexistent/credentials.json").unwrap_err();
        assert_eq!(
            err.code(),
            crate::error::ProviderErrorCode::ConfigurationError
        );
    }
}
