//! Attach and detach domains on a Vercel project, and read back a domain's DNS configuration.
//!
//! Everything goes through [`DomainClient`]. Its public operations never fail outright; they always return a result
//! value with `success` and, on failure, a human-readable `error`. Use [`DomainClient::request`] directly when typed
//! errors are needed instead.

pub mod api;

pub use self::api::model::{AddDomainResult, DomainConfigResult, OperationResult, RemoveDomainResult};
pub use self::api::{ApiError, ClientConfig, ConfigField, DomainClient, DomainError, DomainResult};
