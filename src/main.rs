mod config;
mod logging;

use std::env::{self, VarError};
use std::future::Future;
use std::process::ExitCode;

use clap::Parser;
use futures::future;
use serde::Serialize;
use vercel_domains::{DomainClient, OperationResult};

use self::config::{Args, Command};
use self::logging::Logger;

/// Reads an environment variable. Anything from a `.env` file has already been loaded into the environment by then.
pub fn get_var(key: &str) -> Result<String, VarError> {
    env::var(key)
}

/// A missing `.env` is fine, but one that exists and can't be read or parsed is an error.
#[cfg(feature = "dotenv")]
fn load_dotenv<T>(loaded: Result<T, dotenvy::Error>) -> eyre::Result<()> {
    match loaded {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(eyre::Report::new(err).wrap_err("Failed to load .env file")),
    }
}

/// How results get printed on top of being logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Log,
    JsonLines,
    Pretty,
}

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    #[cfg(feature = "dotenv")]
    load_dotenv(dotenvy::dotenv())?;

    let args = Args::parse();
    Logger::new(args.log_level).init()?;

    let client = DomainClient::new(config::client_config(&args).await?)?;
    log::trace!("Using {:?}", client.config());

    let output = match (&args.command, args.json) {
        (_, true) => Output::JsonLines,
        // Diagnostics are useless if they're only logged.
        (Command::Config { .. }, false) => Output::Pretty,
        (_, false) => Output::Log,
    };

    let all_ok = match &args.command {
        Command::AddSubdomain { subdomains } => run_all("add", subdomains, output, |s| client.add_subdomain(s)).await?,
        Command::RemoveSubdomain { subdomains } => {
            run_all("remove", subdomains, output, |s| client.remove_subdomain(s)).await?
        },
        Command::AddDomain { domains } => run_all("add", domains, output, |d| client.add_custom_domain(d)).await?,
        Command::RemoveDomain { domains } => {
            run_all("remove", domains, output, |d| client.remove_custom_domain(d)).await?
        },
        Command::Config { domains } => run_all("look up", domains, output, |d| client.get_domain_config(d)).await?,
    };

    Ok(if all_ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Runs one operation per name concurrently, then reports each result in argument order.
///
/// Returns whether every operation succeeded.
async fn run_all<'a, R, F, Fut>(action: &str, names: &'a [String], output: Output, op: F) -> eyre::Result<bool>
where
    R: OperationResult + Serialize,
    F: Fn(&'a str) -> Fut,
    Fut: Future<Output = R>,
{
    let results = future::join_all(names.iter().map(|name| op(name.as_str()))).await;

    let mut all_ok = true;
    for (name, result) in names.iter().zip(&results) {
        match result.error() {
            None => log::info!("[{name}] Done"),
            Some(err) => {
                all_ok = false;
                log::error!("[{name}] Failed to {action}: {err}");
            },
        }

        match output {
            Output::Log => {},
            Output::JsonLines => println!("{}", serde_json::to_string(result)?),
            Output::Pretty => println!("{name}: {}", serde_json::to_string_pretty(result)?),
        }
    }

    Ok(all_ok)
}
