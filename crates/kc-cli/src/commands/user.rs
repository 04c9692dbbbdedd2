//! User management commands.

use std::collections::BTreeSet;

use kc_admin_client::{
    EnrichedUser, EnrichmentFetcher, NewUser, NoiseFilter, PageWindow, PasswordReset,
    ReconcileOutcome, RoleReconciler, UnknownRolePolicy,
};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::UserCommand;
use crate::config::OutputFormat;
use crate::output::{info, output, output_single, prompt_new_password, success, warning};

use super::AdminContext;

/// User representation for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct UserRow {
    /// User ID.
    pub id: String,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Whether the user is enabled.
    pub enabled: bool,
    /// Assigned realm roles.
    pub roles: String,
}

impl From<&EnrichedUser> for UserRow {
    fn from(enriched: &EnrichedUser) -> Self {
        Self {
            id: enriched.user.id.clone(),
            username: enriched.user.username.clone(),
            email: enriched.user.email.clone().unwrap_or_default(),
            enabled: enriched.user.enabled,
            roles: enriched.roles.iter().map(String::as_str).collect::<Vec<_>>().join(", "),
        }
    }
}

/// Runs a user command.
pub async fn run_user(
    cmd: UserCommand,
    ctx: &AdminContext,
    format: OutputFormat,
) -> crate::CliResult<()> {
    match cmd {
        UserCommand::List { first, max } => {
            list_users(ctx, PageWindow::new(first, max), format).await
        }
        UserCommand::Create {
            username,
            email,
            enabled,
            email_verified,
            password,
            temporary_password,
        } => {
            let mut user = NewUser::new(username).enabled(enabled).email_verified(email_verified);
            if let Some(email) = email {
                user = user.email(email);
            }
            let reset = password.map(|p| PasswordReset::new(p).temporary(temporary_password));
            create_user(ctx, &user, reset, format).await
        }
        UserCommand::SetPassword { id, password, temporary } => {
            let password = match password {
                Some(p) => p,
                None => prompt_new_password()?,
            };
            ctx.client
                .reset_password(&id, &PasswordReset::new(password).temporary(temporary))
                .await?;
            success(&format!("Password for user '{id}' set successfully"));
            Ok(())
        }
        UserCommand::SetRoles { id, roles, on_unknown } => {
            let desired: BTreeSet<String> = roles.into_iter().collect();
            set_roles(ctx, &id, &desired, on_unknown.into(), format).await
        }
    }
}

async fn list_users(
    ctx: &AdminContext,
    window: PageWindow,
    format: OutputFormat,
) -> crate::CliResult<()> {
    let page = EnrichmentFetcher::new(ctx.client.clone(), &ctx.config)
        .list_enriched(window)
        .await?;

    let rows: Vec<UserRow> = page.users.iter().map(UserRow::from).collect();
    output(&rows, &page, format, |r| Some(r.id.as_str()))?;

    if format == OutputFormat::Table {
        for w in &page.warnings {
            warning(&format!("roles unavailable for '{}': {}", w.username, w.message));
        }
        if !page.users.is_empty() {
            info(&format!(
                "Showing {}-{} of {}",
                window.offset + 1,
                u64::from(window.offset) + page.users.len() as u64,
                page.total
            ));
        }
    }
    Ok(())
}

async fn create_user(
    ctx: &AdminContext,
    user: &NewUser,
    password: Option<PasswordReset>,
    format: OutputFormat,
) -> crate::CliResult<()> {
    let created = ctx.client.create_user(user).await?;
    if let Some(reset) = password {
        ctx.client.reset_password(&created.id, &reset).await?;
    }

    match format {
        OutputFormat::Table => success(&format!(
            "User '{}' created with id {}",
            created.username, created.id
        )),
        OutputFormat::Json => output_single(&created, format)?,
        OutputFormat::Quiet => println!("{}", created.id),
    }
    Ok(())
}

/// Splits requested names into assignable ones and ignored noise names.
fn without_noise(
    noise: &NoiseFilter,
    requested: &BTreeSet<String>,
) -> (BTreeSet<String>, Vec<String>) {
    let (ignored, assignable): (BTreeSet<String>, BTreeSet<String>) =
        requested.iter().cloned().partition(|name| noise.is_noise(name));
    (assignable, ignored.into_iter().collect())
}

/// Reconciles a user's realm roles against the desired set.
///
/// Noise roles are left out of both sides: they are never revoked, and
/// asking for one is ignored with a warning.
async fn set_roles(
    ctx: &AdminContext,
    user_id: &str,
    desired: &BTreeSet<String>,
    policy: UnknownRolePolicy,
    format: OutputFormat,
) -> crate::CliResult<()> {
    let noise = NoiseFilter::from_config(&ctx.config);
    let (desired, ignored) = without_noise(&noise, desired);
    if !ignored.is_empty() {
        warning(&format!("Ignoring implicit roles: {}", ignored.join(", ")));
    }

    let (current, catalog) = tokio::join!(
        ctx.client.user_realm_roles(user_id),
        ctx.client.role_catalog()
    );
    let current = noise.role_names(current?);
    let catalog = catalog?;

    let outcome = RoleReconciler::new(ctx.client.clone())
        .with_policy(policy)
        .reconcile(user_id, &current, &desired, &catalog)
        .await?;

    match format {
        OutputFormat::Json => output_single(&outcome, format)?,
        OutputFormat::Table => report_outcome(user_id, &outcome),
        OutputFormat::Quiet => {}
    }
    Ok(())
}

fn report_outcome(user_id: &str, outcome: &ReconcileOutcome) {
    if outcome.is_noop() && outcome.unresolved.is_empty() {
        info(&format!("Roles for '{user_id}' already up to date"));
        return;
    }
    if !outcome.granted.is_empty() {
        success(&format!("Granted: {}", names(&outcome.granted)));
    }
    if !outcome.revoked.is_empty() {
        success(&format!("Revoked: {}", names(&outcome.revoked)));
    }
    if !outcome.unresolved.is_empty() {
        warning(&format!("Unknown roles skipped: {}", outcome.unresolved.join(", ")));
    }
}

fn names(roles: &[kc_admin_client::RoleRef]) -> String {
    roles.iter().map(|r| r.name.as_str()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use kc_admin_client::UserRepresentation;

    use super::*;

    #[test]
    fn implicit_roles_are_not_requested() {
        let noise = NoiseFilter::from_config(&kc_admin_client::ClientConfig::default());
        let requested: BTreeSet<String> = ["offline_access", "doctor", "default-roles-clinic"]
            .into_iter()
            .map(String::from)
            .collect();

        let (assignable, ignored) = without_noise(&noise, &requested);
        assert_eq!(assignable.into_iter().collect::<Vec<_>>(), vec!["doctor"]);
        assert_eq!(ignored, vec!["default-roles-clinic", "offline_access"]);

        // the noise-filtered current set of a user holding only implicit
        // roles then matches, so nothing is granted again
        let only_implicit: BTreeSet<String> =
            ["offline_access"].into_iter().map(String::from).collect();
        let (desired, _) = without_noise(&noise, &only_implicit);
        let current = noise.role_names(vec![kc_admin_client::RoleRepresentation {
            id: "r9".into(),
            name: "offline_access".into(),
            description: None,
            composite: false,
            client_role: false,
        }]);
        assert!(kc_admin_client::ReconcilePlan::compute(&current, &desired).is_empty());
    }

    #[test]
    fn row_joins_roles_in_order() {
        let enriched = EnrichedUser {
            user: UserRepresentation {
                id: "u1".into(),
                username: "alice".into(),
                email: None,
                first_name: None,
                last_name: None,
                enabled: true,
                email_verified: false,
            },
            roles: ["nurse", "admin"].into_iter().map(String::from).collect(),
        };
        let row = UserRow::from(&enriched);
        assert_eq!(row.roles, "admin, nurse");
        assert_eq!(row.email, "");
    }
}
