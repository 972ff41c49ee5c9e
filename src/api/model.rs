use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::error::DomainError;

type JsonObject = JsonMap<String, JsonValue>;

/// Common view over the results of every [`DomainClient`][super::DomainClient] operation.
pub trait OperationResult {
    fn success(&self) -> bool;
    fn error(&self) -> Option<&str>;
}

/// Outcome of adding a subdomain or custom domain to the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDomainResult {
    pub success: bool,
    /// The domain that was added (as named by Vercel, when it says), or the one that failed to be added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AddDomainResult {
    pub fn added(domain: String) -> Self {
        Self {
            success: true,
            domain: Some(domain),
            error: None,
        }
    }

    pub fn failed(domain: Option<String>, err: &DomainError) -> Self {
        Self {
            success: false,
            domain,
            error: Some(err.to_string()),
        }
    }
}

/// Outcome of removing a subdomain or custom domain from the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveDomainResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemoveDomainResult {
    pub fn removed() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(err: &DomainError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
        }
    }
}

/// Which fields of Vercel's `/v6/domains/{domain}/config` response are kept, and the name each one is kept under.
pub const DOMAIN_CONFIG_FIELDS: &[(&str, &str)] = &[
    ("configuredBy", "configured_by"),
    ("nameservers", "nameservers"),
    ("serviceType", "service_type"),
    ("cnames", "cnames"),
    ("aValues", "a_values"),
    ("conflicts", "conflicts"),
    ("acceptedChallenges", "accepted_challenges"),
    ("recommendedIPv4", "recommended_ipv4"),
    ("recommendedCNAME", "recommended_cname"),
    ("ipStatus", "ip_status"),
    ("misconfigured", "misconfigured"),
];

/// Outcome of looking up a domain's DNS configuration.
///
/// The diagnostic fields are copied as-is from Vercel's response, renamed according to [`DOMAIN_CONFIG_FIELDS`]. A
/// field Vercel did not send is simply not in [`fields`][Self::fields]; one it sent as `null` is kept as `null`. The
/// typed accessors are a convenience on top of that and return `None` both when a field is absent and when it doesn't
/// have the expected shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainConfigResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(flatten)]
    pub fields: JsonObject,
}

impl DomainConfigResult {
    /// Builds a successful result by projecting the recognized fields out of a raw response.
    pub fn from_response(response: &JsonValue) -> Self {
        let mut fields = JsonObject::new();
        if let Some(map) = response.as_object() {
            for &(source, target) in DOMAIN_CONFIG_FIELDS {
                if let Some(value) = map.get(source) {
                    fields.insert(target.to_string(), value.clone());
                }
            }
        }

        Self {
            success: true,
            error: None,
            fields,
        }
    }

    pub fn failed(err: &DomainError) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            fields: JsonObject::new(),
        }
    }

    /// Gets a mirrored field by its target name (e.g. `"recommended_ipv4"`).
    pub fn get(&self, field: &str) -> Option<&JsonValue> {
        self.fields.get(field)
    }

    pub fn misconfigured(&self) -> Option<bool> {
        self.get("misconfigured").and_then(JsonValue::as_bool)
    }

    pub fn configured_by(&self) -> Option<&str> {
        self.get("configured_by").and_then(JsonValue::as_str)
    }

    pub fn nameservers(&self) -> Option<Vec<String>> {
        self.typed("nameservers")
    }

    pub fn recommended_ipv4(&self) -> Option<Vec<RecommendedRecord>> {
        self.typed("recommended_ipv4")
    }

    pub fn recommended_cname(&self) -> Option<Vec<RecommendedRecord>> {
        self.typed("recommended_cname")
    }

    fn typed<T: serde::de::DeserializeOwned>(&self, field: &str) -> Option<T> {
        let value = self.get(field)?;
        T::deserialize(value).ok()
    }
}

/// One of Vercel's recommended DNS values, lower ranks being preferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedRecord {
    pub rank: u32,
    pub value: RecordValue,
}

/// Recommended IPv4 entries carry a list of addresses; recommended CNAME entries carry a single target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    One(String),
    Many(Vec<String>),
}

impl RecordValue {
    /// Iterates over every value, whether there's one or many.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice = match self {
            RecordValue::One(value) => std::slice::from_ref(value),
            RecordValue::Many(values) => &values[..],
        };
        slice.iter().map(String::as_str)
    }
}

impl OperationResult for AddDomainResult {
    fn success(&self) -> bool {
        self.success
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl OperationResult for RemoveDomainResult {
    fn success(&self) -> bool {
        self.success
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl OperationResult for DomainConfigResult {
    fn success(&self) -> bool {
        self.success
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
