use reqwest::StatusCode;
use serde_json::Value as JsonValue;

use super::config::ConfigField;
use super::{DOMAIN_IN_USE_MESSAGE, JsonValueExt};

pub type DomainResult<T> = Result<T, DomainError>;

/// Everything that can go wrong while talking to Vercel.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Missing required configuration: {}", fmt_fields(.0))]
    MissingConfig(Vec<ConfigField>),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Invalid domain name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Invalid API base URL {0:?}")]
    InvalidBaseUrl(String),

    #[error("{}", DOMAIN_IN_USE_MESSAGE)]
    DomainInUse,

    #[error("Vercel API returned invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("failed to send request to Vercel API: {0}")]
    Request(#[from] reqwest::Error),
}

fn fmt_fields(fields: &[ConfigField]) -> String {
    fields.iter().map(|f| f.name()).collect::<Vec<_>>().join(", ")
}

/// A response from Vercel with a status that the request did not accept.
///
/// Vercel reports errors as `{"error": {"code": ..., "message": ...}}`; the code and message are pulled out of that
/// (or out of the top level, when the `error` wrapper is missing) so they can be matched on directly. The whole
/// response is kept in [`body`][Self::body], as a JSON string when it wasn't JSON at all.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Vercel API request failed with status {status}: {body}")]
pub struct ApiError {
    pub status: StatusCode,
    pub code: Option<String>,
    pub message: Option<String>,
    pub body: JsonValue,
}

impl ApiError {
    pub fn from_response(status: StatusCode, body: JsonValue) -> Self {
        let detail = body.get("error").filter(|e| e.is_object()).unwrap_or(&body);
        let code = detail.get_str("code").map(str::to_string);
        let message = detail.get_str("message").map(str::to_string);

        Self {
            status,
            code,
            message,
            body,
        }
    }

    /// Checks whether Vercel tagged this error with the given code.
    pub fn is_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn nested_error_is_parsed() {
        let err = ApiError::from_response(
            StatusCode::CONFLICT,
            json!({ "error": { "code": "domain_already_in_use", "message": "Cannot add domain" } }),
        );
        assert_eq!(err.code.as_deref(), Some("domain_already_in_use"));
        assert_eq!(err.message.as_deref(), Some("Cannot add domain"));
        assert!(err.is_code("domain_already_in_use"));
    }

    #[test]
    fn top_level_error_is_parsed() {
        let err = ApiError::from_response(StatusCode::BAD_REQUEST, json!({ "code": "bad_request", "message": "nope" }));
        assert_eq!(err.code.as_deref(), Some("bad_request"));
        assert_eq!(err.message.as_deref(), Some("nope"));
    }

    #[test]
    fn raw_body_has_no_code() {
        let err = ApiError::from_response(StatusCode::BAD_GATEWAY, json!("<html>Bad Gateway</html>"));
        assert_eq!(err.code, None);
        assert_eq!(err.message, None);
        assert!(!err.is_code("domain_already_in_use"));
    }

    #[test]
    fn display_includes_status_and_body() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, json!({ "error": { "code": "not_found" } }));
        let msg = err.to_string();
        assert!(msg.contains("404"), "{msg}");
        assert!(msg.contains("not_found"), "{msg}");
    }

    #[test]
    fn display_missing_config() {
        let err = DomainError::MissingConfig(vec![ConfigField::ProjectId, ConfigField::BearerToken]);
        assert_eq!(err.to_string(), "Missing required configuration: project_id, bearer_token");
    }

    #[test]
    fn display_domain_in_use() {
        assert_eq!(DomainError::DomainInUse.to_string(), "This domain is already in use by another Vercel project");
    }

    #[test]
    fn display_invalid_name() {
        let err = DomainError::InvalidName {
            name: "..".into(),
            reason: "may not be `.` or `..`",
        };
        assert_eq!(err.to_string(), "Invalid domain name \"..\": may not be `.` or `..`");
    }

    #[test]
    fn from_json_error() {
        let json_err = serde_json::from_str::<JsonValue>("not json").unwrap_err();
        let err: DomainError = json_err.into();
        assert!(matches!(err, DomainError::InvalidJson(_)));
    }
}
