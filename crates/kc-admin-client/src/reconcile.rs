//! Role assignment reconciliation.
//!
//! The server only offers "add these mappings" and "remove these mappings".
//! Moving a user to a desired role set means diffing it against the current
//! set and issuing at most one grant and one revoke call. The two calls are
//! not atomic; reconciling again from fresh server state converges.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::client::AdminClient;
use crate::dto::RoleRef;
use crate::error::{AdminError, AdminResult, ReconcileStep};
use crate::roles::RoleCatalog;

/// What to do with role names the catalog does not know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownRolePolicy {
    /// Leave them out of the calls and report them in the outcome.
    #[default]
    Skip,
    /// Reject the reconciliation before any call is made.
    Fail,
    /// Fetch each missing role by name; skip only those the server reports
    /// as not found.
    Lookup,
}

/// Role names to add and to remove.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcilePlan {
    /// `desired - current`.
    pub to_grant: BTreeSet<String>,
    /// `current - desired`.
    pub to_revoke: BTreeSet<String>,
}

impl ReconcilePlan {
    /// Diffs the current and desired role name sets.
    #[must_use]
    pub fn compute(current: &BTreeSet<String>, desired: &BTreeSet<String>) -> Self {
        Self {
            to_grant: desired.difference(current).cloned().collect(),
            to_revoke: current.difference(desired).cloned().collect(),
        }
    }

    /// Returns true if the sets already match.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_grant.is_empty() && self.to_revoke.is_empty()
    }

    /// Resolves names to mapping references through the catalog.
    #[must_use]
    pub fn resolve(&self, catalog: &RoleCatalog) -> Resolution {
        let mut resolution = Resolution::default();
        for name in &self.to_grant {
            match catalog.resolve(name) {
                Some(role) => resolution.grant.push(role),
                None => resolution.unresolved.push(name.clone()),
            }
        }
        for name in &self.to_revoke {
            match catalog.resolve(name) {
                Some(role) => resolution.revoke.push(role),
                None => resolution.unresolved.push(name.clone()),
            }
        }
        resolution
    }
}

/// A plan with names turned into mapping references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Roles for the grant call, by name.
    pub grant: Vec<RoleRef>,
    /// Roles for the revoke call, by name.
    pub revoke: Vec<RoleRef>,
    /// Names with no known role record.
    pub unresolved: Vec<String>,
}

/// What a reconciliation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    /// Roles granted.
    pub granted: Vec<RoleRef>,
    /// Roles revoked.
    pub revoked: Vec<RoleRef>,
    /// Names left out because no role record was found.
    pub unresolved: Vec<String>,
}

impl ReconcileOutcome {
    /// Returns true if no call was made.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.granted.is_empty() && self.revoked.is_empty()
    }
}

/// Applies desired role sets through the admin client.
#[derive(Debug, Clone)]
pub struct RoleReconciler {
    client: AdminClient,
    policy: UnknownRolePolicy,
}

impl RoleReconciler {
    /// Creates a reconciler with the [`UnknownRolePolicy::Skip`] policy.
    #[must_use]
    pub fn new(client: AdminClient) -> Self {
        Self {
            client,
            policy: UnknownRolePolicy::default(),
        }
    }

    /// Sets the unknown-role policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: UnknownRolePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Moves `subject_id` from `current` to `desired`.
    ///
    /// Issues one grant call if anything is added and one revoke call if
    /// anything is removed; an empty diff issues no calls. Both calls are
    /// attempted even if the first one fails.
    ///
    /// # Errors
    ///
    /// - [`AdminError::ReconciliationPartialFailure`] if exactly one of the
    ///   two calls failed.
    /// - The failing call's error, unmodified, if the only call failed or
    ///   both failed (the grant error wins).
    /// - [`AdminError::UnknownRoles`] under [`UnknownRolePolicy::Fail`].
    #[instrument(skip(self, current, desired, catalog), fields(policy = ?self.policy))]
    pub async fn reconcile(
        &self,
        subject_id: &str,
        current: &BTreeSet<String>,
        desired: &BTreeSet<String>,
        catalog: &RoleCatalog,
    ) -> AdminResult<ReconcileOutcome> {
        let plan = ReconcilePlan::compute(current, desired);
        if plan.is_empty() {
            debug!("role sets already match");
            return Ok(ReconcileOutcome::default());
        }

        let mut resolution = plan.resolve(catalog);
        if !resolution.unresolved.is_empty() {
            match self.policy {
                UnknownRolePolicy::Skip => {
                    warn!(roles = ?resolution.unresolved, "skipping roles missing from catalog");
                }
                UnknownRolePolicy::Fail => {
                    return Err(AdminError::UnknownRoles(resolution.unresolved));
                }
                UnknownRolePolicy::Lookup => {
                    self.lookup_missing(&plan, &mut resolution).await?;
                }
            }
        }

        let granted = self
            .apply(ReconcileStep::Grant, subject_id, &resolution.grant)
            .await;
        let revoked = self
            .apply(ReconcileStep::Revoke, subject_id, &resolution.revoke)
            .await;

        match (granted, revoked) {
            (Ok(()), Ok(())) => Ok(ReconcileOutcome {
                granted: resolution.grant,
                revoked: resolution.revoke,
                unresolved: resolution.unresolved,
            }),
            (Err(grant_err), Err(revoke_err)) => {
                warn!(error = %revoke_err, "revoke failed after grant failure");
                Err(grant_err)
            }
            (Err(err), Ok(())) if resolution.revoke.is_empty() => Err(err),
            (Ok(()), Err(err)) if resolution.grant.is_empty() => Err(err),
            (Err(err), Ok(())) => Err(AdminError::ReconciliationPartialFailure {
                applied: ReconcileStep::Revoke,
                failed: ReconcileStep::Grant,
                source: Box::new(err),
            }),
            (Ok(()), Err(err)) => Err(AdminError::ReconciliationPartialFailure {
                applied: ReconcileStep::Grant,
                failed: ReconcileStep::Revoke,
                source: Box::new(err),
            }),
        }
    }

    async fn apply(
        &self,
        step: ReconcileStep,
        subject_id: &str,
        roles: &[RoleRef],
    ) -> AdminResult<()> {
        if roles.is_empty() {
            return Ok(());
        }
        let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
        debug!(%step, roles = ?names, "applying role mappings");
        match step {
            ReconcileStep::Grant => self.client.grant_realm_roles(subject_id, roles).await,
            ReconcileStep::Revoke => self.client.revoke_realm_roles(subject_id, roles).await,
        }
    }

    /// Fetches roles the catalog lacks, moving found ones into the calls.
    async fn lookup_missing(
        &self,
        plan: &ReconcilePlan,
        resolution: &mut Resolution,
    ) -> AdminResult<()> {
        let names = std::mem::take(&mut resolution.unresolved);
        let lookups =
            futures::future::join_all(names.iter().map(|name| self.client.get_realm_role(name)))
                .await;

        for (name, found) in names.into_iter().zip(lookups) {
            match found {
                Ok(role) if plan.to_grant.contains(&name) => resolution.grant.push(role.to_ref()),
                Ok(role) => resolution.revoke.push(role.to_ref()),
                Err(err) if err.is_not_found() => {
                    warn!(role = %name, "role not found on server, skipping");
                    resolution.unresolved.push(name);
                }
                Err(err) => return Err(err),
            }
        }

        resolution.grant.sort_by(|a, b| a.name.cmp(&b.name));
        resolution.revoke.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(())
    }
}
