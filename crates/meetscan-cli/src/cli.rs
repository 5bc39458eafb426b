//! Command-line interface definition.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use meetscan_providers::ScanOptions;

/// meetscan - scan calendars for upcoming video meetings
#[derive(Debug, Parser)]
#[command(name = "meetscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Calendar name filter
    #[arg(long, short = 'f', default_value = "work: ")]
    pub calendar_filter: String,

    /// Include meetings that started up to this many hours ago
    #[arg(long, short = 'B', default_value_t = 1)]
    pub before: u32,

    /// Include meetings that start up to this many hours in the future
    #[arg(long, short = 'A', default_value_t = 8)]
    pub after: u32,

    /// Only return meetings whose location carries a zoom.us URL
    #[arg(long, short = 'w')]
    pub with_url: bool,

    /// Enable debug logging
    #[arg(long, short = 'D')]
    pub debug: bool,

    #[command(subcommand)]
    pub backend: Backend,
}

impl Cli {
    /// Maps the global flags onto scan options.
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            calendar_filter: self.calendar_filter.clone(),
            hours_before: self.before,
            hours_after: self.after,
            only_with_url: self.with_url,
        }
    }
}

/// Calendar backends.
#[derive(Debug, Subcommand)]
pub enum Backend {
    /// Google Calendar backend
    Gcal {
        /// Path to the file holding the Google credentials (JSON)
        #[arg(long, short = 'c', env = "GCSA_CREDENTIALS")]
        credentials_path: Option<PathBuf>,
    },

    /// Microsoft Exchange backend
    Exchange {
        /// Username
        #[arg(long, short = 'u')]
        username: String,

        /// Password
        #[arg(long, short = 'p')]
        password: String,

        /// Email; defaults to the username
        #[arg(long, short = 'e')]
        email: Option<String>,
    },

    /// Anything else typed as a backend name.
    #[command(external_subcommand)]
    Other(Vec<OsString>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["meetscan", "gcal"]).unwrap();
        assert_eq!(cli.calendar_filter, "work: ");
        assert_eq!(cli.before, 1);
        assert_eq!(cli.after, 8);
        assert!(!cli.with_url);
        assert!(!cli.debug);
        assert!(matches!(
            cli.backend,
            Backend::Gcal {
                credentials_path: None
            }
        ));
    }

    #[test]
    fn scan_options_mapping() {
        let cli = Cli::try_parse_from([
            "meetscan", "-f", "team: ", "-B", "2", "-A", "4", "-w", "gcal",
        ])
        .unwrap();

        let options = cli.scan_options();
        assert_eq!(options.calendar_filter, "team: ");
        assert_eq!(options.hours_before, 2);
        assert_eq!(options.hours_after, 4);
        assert!(options.only_with_url);
    }

    #[test]
    fn gcal_credentials_path() {
        let cli =
            Cli::try_parse_from(["meetscan", "gcal", "-c", "/tmp/credentials.json"]).unwrap();
        match cli.backend {
            Backend::Gcal { credentials_path } => {
                assert_eq!(credentials_path, Some(PathBuf::from("/tmp/credentials.json")));
            }
            other => panic!("unexpected backend: {:?}", other),
        }
    }

    #[test]
    fn exchange_requires_username_and_password() {
        assert!(Cli::try_parse_from(["meetscan", "exchange"]).is_err());
        assert!(Cli::try_parse_from(["meetscan", "exchange", "-u", "jdoe"]).is_err());

        let cli = Cli::try_parse_from([
            "meetscan", "exchange", "-u", "jdoe", "-p", "hunter2", "-e", "jdoe@example.com",
        ])
        .unwrap();
        match cli.backend {
            Backend::Exchange {
                username,
                password,
                email,
            } => {
                assert_eq!(username, "jdoe");
                assert_eq!(password, "hunter2");
                assert_eq!(email, Some("jdoe@example.com".to_string()));
            }
            other => panic!("unexpected backend: {:?}", other),
        }
    }

    #[test]
    fn backend_is_required() {
        assert!(Cli::try_parse_from(["meetscan"]).is_err());
    }

    #[test]
    fn unknown_backend_is_captured() {
        let cli = Cli::try_parse_from(["meetscan", "caldav"]).unwrap();
        match cli.backend {
            Backend::Other(args) => assert_eq!(args[0], OsString::from("caldav")),
            other => panic!("unexpected backend: {:?}", other),
        }
    }
}
