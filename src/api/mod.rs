mod client;
mod config;
mod error;
pub mod model;

use reqwest::StatusCode;
use serde_json::Value as JsonValue;

pub use self::client::DomainClient;
pub use self::config::{ClientConfig, ConfigField};
pub use self::error::{ApiError, DomainError, DomainResult};

/// Where the Vercel REST API lives when no other base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.vercel.com";

/// Error code Vercel uses when a domain is already attached to some other project.
pub const DOMAIN_IN_USE_CODE: &str = "domain_already_in_use";

/// Message substituted for [`DOMAIN_IN_USE_CODE`] errors when adding a custom domain.
pub const DOMAIN_IN_USE_MESSAGE: &str = "This domain is already in use by another Vercel project";

/// Marker trait for the two kinds of domain a project can have attached: [`Subdomain`]s of the configured base domain
/// and caller-supplied [`CustomDomain`]s.
pub trait DomainKind {
    /// Which configuration fields must be present before touching this kind of domain, in reporting order.
    const REQUIRED: &'static [ConfigField];

    /// Non-2xx statuses that still count as a successful removal.
    const REMOVE_ALLOWED: &'static [StatusCode];

    /// Turns the name given by the caller into the full domain name sent to Vercel.
    ///
    /// Only called once [`REQUIRED`][Self::REQUIRED] has been validated.
    fn full_name(config: &ClientConfig, name: &str) -> String;

    /// Gives this kind of domain a chance to replace a creation error with something friendlier.
    fn map_create_error(err: DomainError) -> DomainError {
        err
    }
}

/// The [`DomainKind`] for names prefixed onto the configured base domain.
pub struct Subdomain;

/// The [`DomainKind`] for full domain names supplied by the caller.
pub struct CustomDomain;

impl DomainKind for Subdomain {
    const REQUIRED: &'static [ConfigField] = &[ConfigField::BaseDomain, ConfigField::ProjectId, ConfigField::BearerToken];
    const REMOVE_ALLOWED: &'static [StatusCode] = &[];

    fn full_name(config: &ClientConfig, name: &str) -> String {
        format!("{name}.{}", config.base_domain().unwrap_or_default())
    }
}

impl DomainKind for CustomDomain {
    const REQUIRED: &'static [ConfigField] = &[ConfigField::ProjectId, ConfigField::BearerToken];
    // Removing a domain that's already gone is not an error.
    const REMOVE_ALLOWED: &'static [StatusCode] = &[StatusCode::NOT_FOUND];

    fn full_name(_config: &ClientConfig, name: &str) -> String {
        name.to_string()
    }

    fn map_create_error(err: DomainError) -> DomainError {
        match err {
            DomainError::Api(ref api) if api.is_code(DOMAIN_IN_USE_CODE) => DomainError::DomainInUse,
            other => other,
        }
    }
}

/// Checks a caller-supplied domain or subdomain before it is used in a request.
///
/// Names end up as a single URL path segment, so `.` and `..` are rejected outright; other URL-significant characters
/// like `/`, `?` and `#` are percent-encoded when the URL is built.
pub fn check_name(name: &str) -> DomainResult<()> {
    let reason = if name.is_empty() {
        "may not be empty"
    } else if name == "." || name == ".." {
        "may not be `.` or `..`"
    } else if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        "may not contain whitespace or control characters"
    } else {
        return Ok(());
    };

    Err(DomainError::InvalidName {
        name: name.to_string(),
        reason,
    })
}

pub(crate) trait JsonValueExt {
    /// Combines [`JsonValue::get`] and [`JsonValue::as_str`] into one method that only returns the value if it both
    /// exists and is a string.
    fn get_str(&self, key: &str) -> Option<&str>;
}

impl JsonValueExt for JsonValue {
    #[inline]
    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(JsonValue::as_str)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn subdomain_is_prefixed_onto_base_domain() {
        let config = ClientConfig::default().with_base_domain("example.com");
        assert_eq!(Subdomain::full_name(&config, "staging"), "staging.example.com");
    }

    #[test]
    fn custom_domain_is_used_verbatim() {
        let config = ClientConfig::default().with_base_domain("example.com");
        assert_eq!(CustomDomain::full_name(&config, "shop.example.org"), "shop.example.org");
    }

    #[test]
    fn only_custom_domains_translate_domain_in_use() {
        let in_use = || {
            DomainError::Api(ApiError::from_response(
                StatusCode::CONFLICT,
                json!({ "error": { "code": DOMAIN_IN_USE_CODE, "message": "taken" } }),
            ))
        };

        assert!(matches!(CustomDomain::map_create_error(in_use()), DomainError::DomainInUse));
        assert!(matches!(Subdomain::map_create_error(in_use()), DomainError::Api(_)));
    }

    #[test]
    fn other_custom_domain_errors_pass_through() {
        let err = DomainError::Api(ApiError::from_response(
            StatusCode::BAD_REQUEST,
            json!({ "error": { "code": "invalid_domain", "message": "bad name" } }),
        ));
        let mapped = CustomDomain::map_create_error(err);
        assert!(matches!(mapped, DomainError::Api(ref api) if api.code.as_deref() == Some("invalid_domain")));
    }

    #[test]
    fn ordinary_names_pass() {
        assert!(check_name("staging").is_ok());
        assert!(check_name("shop.example.org").is_ok());
        assert!(check_name("_acme-challenge").is_ok());
    }

    #[test]
    fn unusable_names_are_rejected() {
        for name in ["", ".", "..", "a b", "tab\there", "line\nbreak"] {
            let err = check_name(name).unwrap_err();
            assert!(matches!(err, DomainError::InvalidName { .. }), "{name:?} gave {err:?}");
        }
    }

    #[test]
    fn get_str_ignores_non_strings() {
        let value = json!({ "name": "a.com", "count": 3 });
        assert_eq!(value.get_str("name"), Some("a.com"));
        assert_eq!(value.get_str("count"), None);
        assert_eq!(value.get_str("missing"), None);
    }
}
