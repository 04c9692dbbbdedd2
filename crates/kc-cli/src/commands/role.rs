//! Realm role commands.

use serde::Serialize;
use tabled::Tabled;

use crate::cli::RoleCommand;
use crate::config::OutputFormat;
use crate::output::output;

use super::AdminContext;

/// Role representation for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct RoleRow {
    /// Role ID.
    pub id: String,
    /// Role name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Whether it's a composite role.
    pub composite: bool,
}

/// Runs a role command.
pub async fn run_role(
    cmd: RoleCommand,
    ctx: &AdminContext,
    format: OutputFormat,
) -> crate::CliResult<()> {
    match cmd {
        RoleCommand::List => {
            let catalog = ctx.client.role_catalog().await?;
            let roles = catalog.roles();
            let rows: Vec<RoleRow> = roles
                .iter()
                .map(|r| RoleRow {
                    id: r.id.clone(),
                    name: r.name.clone(),
                    description: r.description.clone().unwrap_or_default(),
                    composite: r.composite,
                })
                .collect();
            output(&rows, &roles, format, |r| Some(r.name.as_str()))
        }
    }
}
