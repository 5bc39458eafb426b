//! Exchange (EWS) provider configuration.

use std::time::Duration;
use url::Url;

/// Configuration for the Exchange provider.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Username for authentication.
    pub username: String,

    /// Password for authentication.
    pub password: String,

    /// Mailbox address; defaults to the username.
    pub email: String,

    /// The EWS endpoint URL.
    pub ews_url: Url,

    /// Whether to verify TLS certificates.
    pub verify_tls: bool,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl ExchangeConfig {
    /// Default EWS endpoint (Office 365).
    pub const DEFAULT_EWS_URL: &'static str = "https://outlook.office365.com/EWS/Exchange.asmx";

    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Creates a new configuration with the given credentials.
    ///
    /// The mailbox address defaults to the username; override it with
    /// [`with_email`](Self::with_email) when the two differ.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            email: username.clone(),
            username,
            password: password.into(),
            ews_url: Url::parse(Self::DEFAULT_EWS_URL).expect("valid default EWS URL"),
            verify_tls: true,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("meetscan/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the mailbox address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Sets the EWS endpoint URL.
    pub fn with_ews_url(mut self, url: Url) -> Self {
        self.ews_url = url;
        self
    }

    /// Disables TLS verification (for testing only).
    pub fn with_insecure_tls(mut self) -> Self {
        self.verify_tls = false;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_defaults_to_username() {
        let config = ExchangeConfig::new("jdoe@example.com", "hunter2");
        assert_eq!(config.email, "jdoe@example.com");
        assert_eq!(config.username, "jdoe@example.com");
        assert!(config.verify_tls);
        assert_eq!(config.ews_url.as_str(), ExchangeConfig::DEFAULT_EWS_URL);
    }

    #[test]
    fn email_override() {
        let config = ExchangeConfig::new("DOMAIN\\jdoe", "hunter2").with_email("jdoe@example.com");
        assert_eq!(config.username, "DOMAIN\\jdoe");
        assert_eq!(config.email, "jdoe@example.com");
    }

    #[test]
    fn builder_methods() {
        let url = Url::parse("https://mail.internal/EWS/Exchange.asmx").unwrap();
        let config = ExchangeConfig::new("u", "p")
            .with_ews_url(url.clone())
            .with_insecure_tls()
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.ews_url, url);
        assert!(!config.verify_tls);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
