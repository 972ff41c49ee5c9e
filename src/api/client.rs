use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use serde_json::{Map as JsonMap, Value as JsonValue, json};

use super::config::{ClientConfig, ConfigField};
use super::error::{ApiError, DomainError, DomainResult};
use super::model::{AddDomainResult, DomainConfigResult, RemoveDomainResult};
use super::{CustomDomain, DomainKind, JsonValueExt, Subdomain, check_name};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

/// The access point to Vercel's project domain API.
///
/// Cloning is cheap and clones share one connection pool.
#[derive(Debug, Clone)]
pub struct DomainClient {
    reqwest: reqwest::Client,
    config: ClientConfig,
}

impl DomainClient {
    pub fn new(config: ClientConfig) -> DomainResult<Self> {
        let client = reqwest::ClientBuilder::new()
            .default_headers(HeaderMap::from_iter([
                (reqwest::header::ACCEPT, HeaderValue::from_static("application/json")),
                (reqwest::header::USER_AGENT, HeaderValue::from_static(USER_AGENT)),
            ]))
            .build()?;

        Ok(Self { reqwest: client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Attaches `{subdomain}.{base_domain}` to the project.
    pub async fn add_subdomain(&self, subdomain: &str) -> AddDomainResult {
        self.add_domain::<Subdomain>(subdomain).await
    }

    /// Detaches `{subdomain}.{base_domain}` from the project. Detaching a subdomain that isn't attached is an error.
    pub async fn remove_subdomain(&self, subdomain: &str) -> RemoveDomainResult {
        self.remove_domain::<Subdomain>(subdomain).await
    }

    /// Attaches an arbitrary domain to the project.
    pub async fn add_custom_domain(&self, domain: &str) -> AddDomainResult {
        self.add_domain::<CustomDomain>(domain).await
    }

    /// Detaches an arbitrary domain from the project. Detaching a domain that isn't attached succeeds.
    pub async fn remove_custom_domain(&self, domain: &str) -> RemoveDomainResult {
        self.remove_domain::<CustomDomain>(domain).await
    }

    /// Fetches Vercel's view of a domain's DNS setup. This is not scoped to the project, so only a token is needed.
    pub async fn get_domain_config(&self, domain: &str) -> DomainConfigResult {
        let checked = self.config.validate(&[ConfigField::BearerToken]).and_then(|()| check_name(domain));
        if let Err(err) = checked {
            log::warn!("Cannot look up configuration for {domain}: {err}");
            return DomainConfigResult::failed(&err);
        }

        let path = ["v6", "domains", domain, "config"];
        match self.request(Method::GET, &path, None, &[]).await {
            Ok(res) => DomainConfigResult::from_response(&res),
            Err(err) => {
                log::warn!("Failed to look up configuration for {domain}: {err}");
                DomainConfigResult::failed(&err)
            },
        }
    }

    async fn add_domain<K: DomainKind>(&self, name: &str) -> AddDomainResult {
        if let Err(err) = self.config.validate(K::REQUIRED).and_then(|()| check_name(name)) {
            log::warn!("Cannot add {name}: {err}");
            return AddDomainResult::failed(None, &err);
        }

        let domain = K::full_name(&self.config, name);
        let path = ["v10", "projects", self.project_id(), "domains"];
        let payload = json!({ "name": domain });

        match self.request(Method::POST, &path, Some(&payload), &[]).await {
            Ok(res) => {
                // Vercel echoes the name back; fall back to ours in case it ever doesn't.
                let added = res.get_str("name").map_or_else(|| domain.clone(), str::to_string);
                log::debug!("Added {added} to project {}", self.project_id());
                AddDomainResult::added(added)
            },
            Err(err) => {
                let err = K::map_create_error(err);
                log::warn!("Failed to add {domain}: {err}");
                AddDomainResult::failed(Some(domain), &err)
            },
        }
    }

    async fn remove_domain<K: DomainKind>(&self, name: &str) -> RemoveDomainResult {
        if let Err(err) = self.config.validate(K::REQUIRED).and_then(|()| check_name(name)) {
            log::warn!("Cannot remove {name}: {err}");
            return RemoveDomainResult::failed(&err);
        }

        let domain = K::full_name(&self.config, name);
        let path = ["v9", "projects", self.project_id(), "domains", domain.as_str()];

        match self.request(Method::DELETE, &path, None, K::REMOVE_ALLOWED).await {
            Ok(_) => {
                log::debug!("Removed {domain} from project {}", self.project_id());
                RemoveDomainResult::removed()
            },
            Err(err) => {
                log::warn!("Failed to remove {domain}: {err}");
                RemoveDomainResult::failed(&err)
            },
        }
    }

    /// Only meaningful once the project ID has been validated.
    fn project_id(&self) -> &str {
        self.config.project_id().unwrap_or_default()
    }

    /// Builds `{base_url}/{segments...}`, percent-encoding each segment so that `/`, `?` and `#` inside a segment can
    /// never change which endpoint is hit.
    pub fn endpoint(&self, segments: &[&str]) -> DomainResult<Url> {
        let base_url = self.config.base_url();
        let invalid = || DomainError::InvalidBaseUrl(base_url.to_string());

        let mut url = Url::parse(base_url).map_err(|_| invalid())?;
        url.path_segments_mut().map_err(|()| invalid())?.pop_if_empty().extend(segments);
        Ok(url)
    }

    /// Makes one authenticated request to the Vercel API and returns the parsed JSON response.
    ///
    /// The path is given as its individual segments (see [`endpoint`][Self::endpoint]). An empty response body comes
    /// back as an empty object. Any status outside of `2xx` is an [`ApiError`] unless it is listed in
    /// `allowed_statuses`, in which case the response is handled as if it had succeeded.
    pub async fn request(
        &self,
        method: Method,
        path: &[&str],
        payload: Option<&JsonValue>,
        allowed_statuses: &[StatusCode],
    ) -> DomainResult<JsonValue> {
        let url = self.endpoint(path)?;
        let path = url.path().to_string();
        let token = self.config.bearer_token().unwrap_or_default();

        log::debug!("{method} {path}");

        let mut req = self.reqwest.request(method.clone(), url).bearer_auth(token);
        if let Some(payload) = payload {
            // Also sets `Content-Type: application/json`.
            req = req.json(payload);
        }

        // Read the body as text before parsing so that an empty body can be told apart from a broken one.
        let res = req.send().await?;
        let status = res.status();
        let res_text = res.text().await?;

        log::debug!("{method} {path} returned {status}");

        if !status.is_success() && !allowed_statuses.contains(&status) {
            let body = parse_body(&res_text).unwrap_or(JsonValue::String(res_text));
            return Err(ApiError::from_response(status, body).into());
        }

        Ok(parse_body(&res_text)?)
    }
}

fn parse_body(text: &str) -> serde_json::Result<JsonValue> {
    if text.trim().is_empty() {
        Ok(JsonValue::Object(JsonMap::new()))
    } else {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_body_is_an_empty_object() {
        assert_eq!(parse_body("").unwrap(), json!({}));
        assert_eq!(parse_body("  \n").unwrap(), json!({}));
    }

    #[test]
    fn broken_body_is_an_error() {
        assert!(parse_body("<html>").is_err());
    }

    fn client(base_url: &str) -> DomainClient {
        DomainClient::new(ClientConfig::new(base_url)).unwrap()
    }

    #[test]
    fn endpoint_encodes_each_segment() {
        let url = client("http://localhost:8080").endpoint(&["v9", "projects", "p", "domains", "x/../a?b#c"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v9/projects/p/domains/x%2F..%2Fa%3Fb%23c");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let url = client("http://localhost:8080/api/").endpoint(&["v6", "domains", "a.com", "config"]).unwrap();
        assert_eq!(url.path(), "/api/v6/domains/a.com/config");
    }

    #[test]
    fn endpoint_rejects_unusable_base_url() {
        let err = client("not a url").endpoint(&["v6"]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidBaseUrl(_)));
    }

    #[test]
    fn user_agent_names_the_crate() {
        assert!(USER_AGENT.starts_with("vercel-domains "));
    }
}
