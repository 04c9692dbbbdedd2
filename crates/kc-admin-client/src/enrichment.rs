//! User listing enriched with realm role assignments.
//!
//! A page of users is fetched together with the collection count, then each
//! user's role mappings are fetched concurrently. A failed role fetch never
//! fails the page: the user is kept with an empty role set and a warning.

use std::collections::{BTreeSet, HashSet};

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{instrument, warn};

use crate::client::AdminClient;
use crate::config::ClientConfig;
use crate::dto::{RoleRepresentation, UserRepresentation};
use crate::error::{AdminError, AdminResult};
use crate::page::PageWindow;

/// Role names hidden from enriched role sets.
///
/// Covers pseudo-roles every user carries (the realm's default-roles
/// composite, `offline_access`, `uma_authorization`).
#[derive(Debug, Clone, Default)]
pub struct NoiseFilter {
    exact: HashSet<String>,
    prefixes: Vec<String>,
}

impl NoiseFilter {
    /// Creates a filter from exact names and name prefixes.
    #[must_use]
    pub fn new(
        exact: impl IntoIterator<Item = String>,
        prefixes: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            exact: exact.into_iter().collect(),
            prefixes: prefixes.into_iter().collect(),
        }
    }

    /// The filter described by the configuration.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            config.noise_roles.iter().cloned(),
            config.noise_role_prefixes.iter().cloned(),
        )
    }

    /// Returns true if the name is hidden.
    #[must_use]
    pub fn is_noise(&self, name: &str) -> bool {
        self.exact.contains(name) || self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    /// Names of the roles that are not hidden.
    #[must_use]
    pub fn role_names(&self, roles: Vec<RoleRepresentation>) -> BTreeSet<String> {
        roles
            .into_iter()
            .map(|r| r.name)
            .filter(|name| !self.is_noise(name))
            .collect()
    }
}

/// A user together with its assigned realm role names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedUser {
    /// The user as listed.
    #[serde(flatten)]
    pub user: UserRepresentation,
    /// Assigned role names, noise removed. Empty if the fetch failed.
    pub roles: BTreeSet<String>,
}

/// A role fetch that failed while enriching a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichmentWarning {
    /// Id of the user shown without roles.
    pub user_id: String,
    /// Username of that user.
    pub username: String,
    /// Why the fetch failed.
    pub message: String,
}

impl EnrichmentWarning {
    fn new(user: &UserRepresentation, error: &AdminError) -> Self {
        Self {
            user_id: user.id.clone(),
            username: user.username.clone(),
            message: error.to_string(),
        }
    }
}

/// One enriched window of the user collection.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedPage {
    /// The requested window.
    pub window: PageWindow,
    /// Users in server order.
    pub users: Vec<EnrichedUser>,
    /// Size of the whole collection.
    pub total: u64,
    /// Users whose roles could not be fetched.
    pub warnings: Vec<EnrichmentWarning>,
}

impl EnrichedPage {
    /// Returns true if items exist past this window.
    #[must_use]
    pub fn has_more(&self) -> bool {
        u64::from(self.window.offset) + (self.users.len() as u64) < self.total
    }

    /// Returns true if any user is shown without its roles.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Fetches user pages and their role assignments.
#[derive(Debug, Clone)]
pub struct EnrichmentFetcher {
    client: AdminClient,
    noise: NoiseFilter,
    concurrency: usize,
}

impl EnrichmentFetcher {
    /// Creates a fetcher using the configured noise set and concurrency.
    #[must_use]
    pub fn new(client: AdminClient, config: &ClientConfig) -> Self {
        Self {
            client,
            noise: NoiseFilter::from_config(config),
            concurrency: config.enrichment_concurrency.max(1),
        }
    }

    /// Replaces the noise filter.
    #[must_use]
    pub fn with_noise_filter(mut self, noise: NoiseFilter) -> Self {
        self.noise = noise;
        self
    }

    /// Lists one window of users, each with its role names.
    ///
    /// The page and the total count are requested concurrently. Role
    /// fetches run at most `enrichment_concurrency` at a time; results keep
    /// the server's user order.
    ///
    /// # Errors
    ///
    /// Fails only if the page or count request fails. A count body that is
    /// not a number is logged and the total falls back to the end of this
    /// window.
    #[instrument(skip(self), fields(offset = window.offset, limit = window.limit))]
    pub async fn list_enriched(&self, window: PageWindow) -> AdminResult<EnrichedPage> {
        let (users, count) =
            tokio::join!(self.client.list_users(window), self.client.count_users());
        let users = users?;
        let total = match count {
            Ok(total) => total,
            Err(AdminError::UnexpectedResponse(reason)) => {
                let fallback = u64::from(window.offset) + users.len() as u64;
                warn!(%reason, fallback, "unreadable user count");
                fallback
            }
            Err(err) => return Err(err),
        };

        let fetched: Vec<(UserRepresentation, AdminResult<Vec<RoleRepresentation>>)> =
            stream::iter(users)
                .map(|user| async move {
                    let roles = self.client.user_realm_roles(&user.id).await;
                    (user, roles)
                })
                .buffered(self.concurrency)
                .collect()
                .await;

        let mut enriched = Vec::with_capacity(fetched.len());
        let mut warnings = Vec::new();
        for (user, roles) in fetched {
            let roles = match roles {
                Ok(roles) => self.noise.role_names(roles),
                Err(err) => {
                    warn!(
                        user_id = %user.id,
                        error = %err,
                        "role fetch failed, listing user without roles"
                    );
                    warnings.push(EnrichmentWarning::new(&user, &err));
                    BTreeSet::new()
                }
            };
            enriched.push(EnrichedUser { user, roles });
        }

        Ok(EnrichedPage {
            window,
            users: enriched,
            total,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str) -> RoleRepresentation {
        RoleRepresentation {
            id: format!("id-{name}"),
            name: name.to_string(),
            description: None,
            composite: false,
            client_role: false,
        }
    }

    #[test]
    fn default_noise_hides_pseudo_roles() {
        let noise = NoiseFilter::from_config(&ClientConfig::default());
        assert!(noise.is_noise("default-roles-clinic"));
        assert!(noise.is_noise("offline_access"));
        assert!(noise.is_noise("uma_authorization"));
        assert!(!noise.is_noise("doctor"));
    }

    #[test]
    fn role_names_are_filtered_and_sorted() {
        let noise = NoiseFilter::from_config(&ClientConfig::default());
        let names = noise.role_names(vec![
            role("offline_access"),
            role("nurse"),
            role("default-roles-clinic"),
            role("admin"),
        ]);
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["admin".to_string(), "nurse".to_string()]
        );
    }

    #[test]
    fn has_more_uses_total() {
        let page = EnrichedPage {
            window: PageWindow::new(0, 2),
            users: Vec::new(),
            total: 1,
            warnings: Vec::new(),
        };
        assert!(page.has_more());
        assert!(!page.is_degraded());
    }
}
