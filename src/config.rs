use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

use eyre::{WrapErr, eyre};
use serde::Deserialize;
use tokio::fs;
use vercel_domains::ClientConfig;
use vercel_domains::api::{DEFAULT_BASE_URL, check_name};

// Command-line flags. Each of the client settings can also come from the environment or from a TOML file; flags and
// environment variables win over the file.
#[derive(Debug, clap::Parser)]
#[command(version, about, max_term_width = 100)]
pub struct Args {
    /// Path to a TOML file with default values for the options below.
    #[arg(short, long, env = "VERCEL_DOMAINS_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Base URL of the Vercel API.
    #[arg(long, env = "VERCEL_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Vercel access token used as the bearer credential.
    #[arg(long, env = "VERCEL_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// ID of the Vercel project that domains are attached to.
    #[arg(long, env = "VERCEL_PROJECT_ID", value_name = "ID")]
    pub project_id: Option<String>,

    /// Domain that subdomains are created under.
    #[arg(long, env = "VERCEL_BASE_DOMAIN", value_name = "DOMAIN")]
    pub base_domain: Option<String>,

    /// Print every result to stdout as a line of JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Controls the verbosity of logs.
    ///
    /// Possible log levels are 'error', 'warn', 'info', 'debug', and 'trace' (in that order).
    #[arg(long, env = "VERCEL_DOMAINS_LOG_LEVEL", value_name = "LEVEL", default_value = "info")]
    pub log_level: log::LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, clap::Subcommand)]
pub enum Command {
    /// Attach subdomains of the base domain to the project.
    AddSubdomain {
        #[arg(required = true, value_parser = domain_segment)]
        subdomains: Vec<String>,
    },

    /// Detach subdomains of the base domain from the project.
    RemoveSubdomain {
        #[arg(required = true, value_parser = domain_segment)]
        subdomains: Vec<String>,
    },

    /// Attach custom domains to the project.
    AddDomain {
        #[arg(required = true, value_parser = domain_segment)]
        domains: Vec<String>,
    },

    /// Detach custom domains from the project. Domains that aren't attached are skipped.
    RemoveDomain {
        #[arg(required = true, value_parser = domain_segment)]
        domains: Vec<String>,
    },

    /// Show Vercel's DNS diagnostics for domains.
    Config {
        #[arg(required = true, value_parser = domain_segment)]
        domains: Vec<String>,
    },
}

impl Command {
    /// The subdomains or domains this command operates on.
    pub fn names(&self) -> &[String] {
        match self {
            Command::AddSubdomain { subdomains } | Command::RemoveSubdomain { subdomains } => subdomains,
            Command::AddDomain { domains } | Command::RemoveDomain { domains } | Command::Config { domains } => domains,
        }
    }
}

/// Values that can be set in the configuration file. All of them are optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub project_id: Option<String>,
    pub base_domain: Option<String>,
}

impl FileConfig {
    pub async fn load(path: &Path) -> eyre::Result<Self> {
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("Reading configuration from {}", path.to_string_lossy());
        }

        let text = fs::read_to_string(path).await.wrap_err("Failed to read config file")?;
        toml::from_str(&text).wrap_err("Failed to parse config file")
    }
}

/// Builds the client configuration out of command line arguments, the environment and the configuration file.
pub async fn client_config(args: &Args) -> eyre::Result<ClientConfig> {
    let file = match &args.config {
        Some(path) => FileConfig::load(path).await?,
        None => FileConfig::default(),
    };

    check_unique(args.command.names()).wrap_err("Invalid arguments")?;
    Ok(merge(args, file))
}

/// Flags and environment variables take precedence over the file.
fn merge(args: &Args, file: FileConfig) -> ClientConfig {
    let api_url = args.api_url.clone().or(file.api_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let mut config = ClientConfig::new(api_url);

    if let Some(token) = args.token.clone().or(file.token) {
        config = config.with_bearer_token(token);
    }
    if let Some(project_id) = args.project_id.clone().or(file.project_id) {
        config = config.with_project_id(project_id);
    }
    if let Some(base_domain) = args.base_domain.clone().or(file.base_domain) {
        config = config.with_base_domain(base_domain);
    }

    config
}

/// Rejects a command that names the same domain twice, since the operations run concurrently.
fn check_unique(names: &[String]) -> eyre::Result<()> {
    let mut seen = HashMap::with_capacity(names.len());
    for (i, name) in names.iter().enumerate() {
        match seen.entry(name.as_str()) {
            Entry::Vacant(entry) => {
                entry.insert(i + 1);
            },
            Entry::Occupied(entry) => {
                let j = *entry.get();
                return Err(eyre!("{name} specified more than once (arguments {j} and {})", i + 1));
            },
        }
    }
    Ok(())
}

/// Value parser for domain names and subdomains, applying the same rules as the client does.
fn domain_segment(s: &str) -> Result<String, String> {
    check_name(s).map(|()| s.to_string()).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn flags_override_file() {
        let args = parse(&["vercel-domains", "--project-id", "from-flag", "add-domain", "a.com"]);
        let file = FileConfig {
            api_url: Some("http://localhost:3000/".into()),
            token: Some("from-file".into()),
            project_id: Some("from-file".into()),
            base_domain: None,
        };

        let config = merge(&args, file);
        assert_eq!(config.base_url(), "http://localhost:3000");
        assert_eq!(config.bearer_token(), Some("from-file"));
        assert_eq!(config.project_id(), Some("from-flag"));
        assert_eq!(config.base_domain(), None);
    }

    #[test]
    fn default_api_url() {
        let args = parse(&["vercel-domains", "config", "a.com"]);
        let config = merge(&args, FileConfig::default());
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn file_rejects_unknown_keys() {
        let res = toml::from_str::<FileConfig>("token = \"abc\"\nteam = \"x\"\n");
        assert!(res.is_err());

        let file = toml::from_str::<FileConfig>("token = \"abc\"\nbase_domain = \"example.com\"\n").unwrap();
        assert_eq!(file.token.as_deref(), Some("abc"));
        assert_eq!(file.base_domain.as_deref(), Some("example.com"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let names = vec!["a".to_string(), "b".to_string(), "a".to_string()];
        let err = check_unique(&names).unwrap_err();
        assert_eq!(err.to_string(), "a specified more than once (arguments 1 and 3)");
        assert!(check_unique(&names[..2]).is_ok());
    }

    #[test]
    fn unusable_names_are_rejected() {
        assert!(Args::try_parse_from(["vercel-domains", "add-subdomain", "bad name"]).is_err());
        assert!(Args::try_parse_from(["vercel-domains", "add-subdomain", ""]).is_err());
        assert!(Args::try_parse_from(["vercel-domains", "remove-domain", ".."]).is_err());
        assert!(Args::try_parse_from(["vercel-domains", "config", "."]).is_err());
        assert!(Args::try_parse_from(["vercel-domains", "remove-domain"]).is_err());
    }

    #[test]
    fn subcommands_expose_their_names() {
        let args = parse(&["vercel-domains", "remove-subdomain", "staging", "preview"]);
        assert_eq!(args.command.names(), ["staging", "preview"]);
    }
}
