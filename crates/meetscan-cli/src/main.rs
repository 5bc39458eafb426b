//! meetscan CLI entry point.

use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;

use meetscan_cli::cli::{Backend, Cli};
use meetscan_cli::error::CliResult;
use meetscan_core::{TracingConfig, init_tracing};
use meetscan_providers::{
    CalendarProvider, ExchangeConfig, ExchangeProvider, GoogleConfig, GoogleProvider, scan,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let tracing_config = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let options = cli.scan_options();

    let provider: Box<dyn CalendarProvider> = match cli.backend {
        Backend::Gcal { credentials_path } => {
            let path = GoogleConfig::resolve_credentials_path(credentials_path);
            Box::new(GoogleProvider::new(GoogleConfig::new(path))?)
        }
        Backend::Exchange {
            username,
            password,
            email,
        } => {
            let mut config = ExchangeConfig::new(username, password);
            if let Some(email) = email {
                config = config.with_email(email);
            }
            Box::new(ExchangeProvider::new(config)?)
        }
        Backend::Other(args) => {
            let name = args
                .first()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            // Reported on stderr only; the process still exits with success.
            eprintln!("Unsupported backend: {}", name);
            return Ok(());
        }
    };

    let meetings = scan(provider.as_ref(), &options, Utc::now()).await?;
    println!("{}", serde_json::to_string(&meetings)?);
    Ok(())
}
