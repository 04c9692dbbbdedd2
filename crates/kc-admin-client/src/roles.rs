//! Realm roles and user role mappings.

use std::collections::HashMap;

use reqwest::Method;
use tracing::instrument;

use crate::client::{segment, AdminClient};
use crate::dto::{RoleRef, RoleRepresentation};
use crate::error::AdminResult;

/// Immutable snapshot of a realm's roles, keyed by name.
///
/// Assignment endpoints need the id+name pair and the catalog is the only
/// source of ids. Callers fetch a snapshot and pass it explicitly; refresh it
/// by fetching a new one.
#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    by_name: HashMap<String, RoleRepresentation>,
}

impl RoleCatalog {
    /// Builds a catalog; later duplicates of a name win.
    #[must_use]
    pub fn new(roles: impl IntoIterator<Item = RoleRepresentation>) -> Self {
        Self {
            by_name: roles.into_iter().map(|r| (r.name.clone(), r)).collect(),
        }
    }

    /// Looks up a role by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RoleRepresentation> {
        self.by_name.get(name)
    }

    /// The mapping reference for a name, if known.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<RoleRef> {
        self.get(name).map(RoleRepresentation::to_ref)
    }

    /// Number of roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns true if the catalog holds no roles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Roles sorted by name.
    #[must_use]
    pub fn roles(&self) -> Vec<&RoleRepresentation> {
        let mut roles: Vec<_> = self.by_name.values().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles
    }
}

impl FromIterator<RoleRepresentation> for RoleCatalog {
    fn from_iter<I: IntoIterator<Item = RoleRepresentation>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl AdminClient {
    /// `GET /roles`: the realm role catalog.
    ///
    /// # Errors
    ///
    /// Propagates classified request failures.
    pub async fn role_catalog(&self) -> AdminResult<RoleCatalog> {
        let roles: Vec<RoleRepresentation> = self.get("/roles", &[]).await?;
        Ok(RoleCatalog::new(roles))
    }

    /// `GET /roles/{name}`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`](crate::AdminError::NotFound) for an
    /// unknown name.
    pub async fn get_realm_role(&self, name: &str) -> AdminResult<RoleRepresentation> {
        self.get(&format!("/roles/{}", segment(name)), &[]).await
    }

    /// `GET /users/{id}/role-mappings/realm`.
    ///
    /// # Errors
    ///
    /// Propagates classified request failures.
    pub async fn user_realm_roles(&self, user_id: &str) -> AdminResult<Vec<RoleRepresentation>> {
        let path = format!("/users/{}/role-mappings/realm", segment(user_id));
        Ok(self
            .request(Method::GET, &path, &[], None::<&()>)
            .await?
            .map(serde_json::from_value::<Vec<RoleRepresentation>>)
            .transpose()?
            .unwrap_or_default())
    }

    /// `POST /users/{id}/role-mappings/realm`.
    ///
    /// # Errors
    ///
    /// Propagates classified request failures.
    #[instrument(skip(self, roles), fields(count = roles.len()))]
    pub async fn grant_realm_roles(&self, user_id: &str, roles: &[RoleRef]) -> AdminResult<()> {
        let path = format!("/users/{}/role-mappings/realm", segment(user_id));
        self.send(Method::POST, &path, roles).await
    }

    /// `DELETE /users/{id}/role-mappings/realm`.
    ///
    /// # Errors
    ///
    /// Propagates classified request failures.
    #[instrument(skip(self, roles), fields(count = roles.len()))]
    pub async fn revoke_realm_roles(&self, user_id: &str, roles: &[RoleRef]) -> AdminResult<()> {
        let path = format!("/users/{}/role-mappings/realm", segment(user_id));
        self.send(Method::DELETE, &path, roles).await
    }
}
