//! Audit event commands.

use kc_admin_client::{AuditEvent, AuditEventType, PageWindow};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::EventsCommand;
use crate::config::OutputFormat;
use crate::output::{info, output};

use super::AdminContext;

/// Event representation for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct EventRow {
    /// When it happened, UTC.
    pub time: String,
    /// Event type.
    #[tabled(rename = "type")]
    pub event_type: String,
    /// Acting user ID.
    pub user: String,
    /// Client ID.
    pub client: String,
    /// Source address.
    pub ip: String,
    /// Error code, if any.
    pub error: String,
}

impl From<&AuditEvent> for EventRow {
    fn from(event: &AuditEvent) -> Self {
        Self {
            time: event.time.format("%Y-%m-%d %H:%M:%S").to_string(),
            event_type: event.event_type.to_string(),
            user: event.user_id.clone().unwrap_or_default(),
            client: event.client_id.clone().unwrap_or_default(),
            ip: event.ip_address.clone().unwrap_or_default(),
            error: event.error.clone().unwrap_or_default(),
        }
    }
}

/// Events have no identifier, so quiet mode prints nothing.
fn quiet_id(_: &EventRow) -> Option<&str> {
    None
}

/// Runs an events command.
pub async fn run_events(
    cmd: EventsCommand,
    ctx: &AdminContext,
    format: OutputFormat,
) -> crate::CliResult<()> {
    match cmd {
        EventsCommand::List { first, max, types } => {
            list_events(ctx, PageWindow::new(first, max), &types, format).await
        }
    }
}

async fn list_events(
    ctx: &AdminContext,
    window: PageWindow,
    types: &[AuditEventType],
    format: OutputFormat,
) -> crate::CliResult<()> {
    let page = ctx.client.list_events(window, types).await?;
    let rows: Vec<EventRow> = page.events.iter().map(EventRow::from).collect();
    output(&rows, &page.events, format, quiet_id)?;

    if format == OutputFormat::Table && page.has_more() {
        let next = window.next();
        info(&format!("More events may exist: --first {} --max {}", next.offset, next.limit));
    }
    Ok(())
}
