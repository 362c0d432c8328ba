//! Client configuration: where the collection lives and which headers
//! accompany writes.

use serde::Deserialize;

/// Environment variable that overrides the endpoint in `from_env`.
pub const ENDPOINT_ENV: &str = "CONTACTS_ENDPOINT";

pub const DEFAULT_ENDPOINT: &str = "api/contacts";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base address of the collection. May be relative to the transport's
    /// origin.
    pub endpoint: String,
    /// Headers sent with every POST and PUT.
    pub headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
        }
    }
}

impl ClientConfig {
    /// Default headers, custom endpoint.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Defaults, with the endpoint taken from `CONTACTS_ENDPOINT` when set.
    pub fn from_env() -> Self {
        match std::env::var(ENDPOINT_ENV) {
            Ok(endpoint) if !endpoint.trim().is_empty() => Self::new(endpoint),
            _ => Self::default(),
        }
    }
}
