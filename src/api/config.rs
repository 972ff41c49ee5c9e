use std::fmt::{self, Debug, Display};

use super::DEFAULT_BASE_URL;
use super::error::{DomainError, DomainResult};

/// One of the configuration values an operation may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    BaseDomain,
    ProjectId,
    BearerToken,
}

impl ConfigField {
    /// The name used for this field in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            ConfigField::BaseDomain => "base_domain",
            ConfigField::ProjectId => "project_id",
            ConfigField::BearerToken => "bearer_token",
        }
    }
}

impl Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a [`DomainClient`][super::DomainClient] needs to talk to Vercel.
///
/// Any of the token, project ID and base domain may be left unset; an empty string counts as unset. Operations that
/// need a missing value fail before making any request (see [`validate`][Self::validate]).
#[derive(Clone)]
pub struct ClientConfig {
    base_url: String,
    bearer_token: Option<String>,
    project_id: Option<String>,
    base_domain: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            bearer_token: None,
            project_id: None,
            base_domain: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Sets the API base URL. Trailing slashes are dropped, since request paths already start with one.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        self.base_url = base_url;
        self
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_base_domain(mut self, base_domain: impl Into<String>) -> Self {
        self.base_domain = Some(base_domain.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url[..]
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.get(ConfigField::BearerToken)
    }

    pub fn project_id(&self) -> Option<&str> {
        self.get(ConfigField::ProjectId)
    }

    pub fn base_domain(&self) -> Option<&str> {
        self.get(ConfigField::BaseDomain)
    }

    /// Looks up a single field, treating empty strings as absent.
    pub fn get(&self, field: ConfigField) -> Option<&str> {
        let value = match field {
            ConfigField::BaseDomain => &self.base_domain,
            ConfigField::ProjectId => &self.project_id,
            ConfigField::BearerToken => &self.bearer_token,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    /// Returns every field in `required` that is unset, keeping the order they were given in.
    pub fn missing(&self, required: &[ConfigField]) -> Vec<ConfigField> {
        required.iter().copied().filter(|&field| self.get(field).is_none()).collect()
    }

    /// Checks that all of `required` are set, reporting every missing one at once.
    pub fn validate(&self, required: &[ConfigField]) -> DomainResult<()> {
        let missing = self.missing(required);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(DomainError::MissingConfig(missing))
        }
    }
}

/// The bearer token is never printed.
impl Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("bearer_token", &self.bearer_token().map(|_| "<redacted>"))
            .field("project_id", &self.project_id)
            .field("base_domain", &self.base_domain)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBDOMAIN_FIELDS: &[ConfigField] = &[ConfigField::BaseDomain, ConfigField::ProjectId, ConfigField::BearerToken];

    #[test]
    fn default_points_at_vercel() {
        assert_eq!(ClientConfig::default().base_url(), "https://api.vercel.com");
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = ClientConfig::new("http://localhost:8080//");
        assert_eq!(config.base_url(), "http://localhost:8080");
    }

    #[test]
    fn all_present_validates() {
        let config = ClientConfig::default()
            .with_base_domain("example.com")
            .with_project_id("project_123")
            .with_bearer_token("token");
        assert!(config.validate(SUBDOMAIN_FIELDS).is_ok());
    }

    #[test]
    fn every_missing_field_is_reported_in_order() {
        let config = ClientConfig::default().with_project_id("project_123");
        let err = config.validate(SUBDOMAIN_FIELDS).unwrap_err();
        assert_eq!(err.to_string(), "Missing required configuration: base_domain, bearer_token");
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let config = ClientConfig::default()
            .with_base_domain("")
            .with_project_id("")
            .with_bearer_token("token");
        assert_eq!(config.missing(SUBDOMAIN_FIELDS), vec![ConfigField::BaseDomain, ConfigField::ProjectId]);
        assert_eq!(config.project_id(), None);
    }

    #[test]
    fn only_the_requested_fields_are_checked() {
        let config = ClientConfig::default().with_bearer_token("token");
        assert!(config.validate(&[ConfigField::BearerToken]).is_ok());
    }

    #[test]
    fn debug_redacts_token() {
        let config = ClientConfig::default().with_bearer_token("super-secret");
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
