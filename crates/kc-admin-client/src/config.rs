//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for [`AdminClient`](crate::AdminClient) and the components
/// layered on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Auth server URL (e.g., http://localhost:8080).
    pub server_url: String,

    /// Realm whose admin endpoints are addressed.
    pub realm: String,

    /// Minimum remaining credential lifetime before a request, in seconds.
    pub refresh_margin_secs: u64,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Maximum number of role fetches in flight while enriching a page.
    pub enrichment_concurrency: usize,

    /// Role names hidden from enriched role sets.
    pub noise_roles: Vec<String>,

    /// Role name prefixes hidden from enriched role sets.
    pub noise_role_prefixes: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8080".to_string(),
            realm: "master".to_string(),
            refresh_margin_secs: 30,
            request_timeout_secs: 30,
            enrichment_concurrency: 8,
            noise_roles: vec![
                "offline_access".to_string(),
                "uma_authorization".to_string(),
            ],
            noise_role_prefixes: vec!["default-roles-".to_string()],
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for a server and realm with default tuning.
    #[must_use]
    pub fn new(server_url: impl Into<String>, realm: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            realm: realm.into(),
            ..Self::default()
        }
    }

    /// Base URL of the realm's admin endpoints.
    #[must_use]
    pub fn admin_base_url(&self) -> String {
        format!(
            "{}/admin/realms/{}",
            self.server_url.trim_end_matches('/'),
            urlencoding::encode(&self.realm)
        )
    }

    /// Safety margin as a duration.
    #[must_use]
    pub fn refresh_margin(&self) -> Duration {
        Duration::from_secs(self.refresh_margin_secs)
    }

    /// Request timeout as a duration.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Checks the configuration for values the client cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Config`](crate::AdminError::Config) on an empty
    /// server URL or realm, or a zero enrichment concurrency.
    pub fn validate(&self) -> crate::AdminResult<()> {
        if self.server_url.trim().is_empty() {
            return Err(crate::AdminError::Config("server_url is empty".to_string()));
        }
        if self.realm.trim().is_empty() {
            return Err(crate::AdminError::Config("realm is empty".to_string()));
        }
        if self.enrichment_concurrency == 0 {
            return Err(crate::AdminError::Config(
                "enrichment_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
