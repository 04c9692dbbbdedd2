//! Read access to the realm's user event log.
//!
//! The endpoint has no count, so whether another page exists is guessed from
//! whether this one came back full.

use serde::Serialize;
use tracing::instrument;

use crate::client::AdminClient;
use crate::dto::{AuditEvent, AuditEventType};
use crate::error::{AdminError, AdminResult};
use crate::page::PageWindow;

/// One window of the event log, newest first as the server orders it.
#[derive(Debug, Clone, Serialize)]
pub struct EventPage {
    /// The requested window.
    pub window: PageWindow,
    /// Events in server order.
    pub events: Vec<AuditEvent>,
}

impl EventPage {
    /// Full-page heuristic; see [`PageWindow::has_more`].
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.window.has_more(self.events.len())
    }
}

impl AdminClient {
    /// `GET /events?first=&max=&type=...`.
    ///
    /// Each filter entry becomes one `type` parameter; an empty filter
    /// returns every type.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Config`] without a request if the filter holds
    /// [`AuditEventType::Unknown`], which has no wire name. Otherwise
    /// propagates classified request failures.
    #[instrument(skip(self, types), fields(offset = window.offset, limit = window.limit))]
    pub async fn list_events(
        &self,
        window: PageWindow,
        types: &[AuditEventType],
    ) -> AdminResult<EventPage> {
        if types.contains(&AuditEventType::Unknown) {
            return Err(AdminError::Config(
                "cannot filter events by the UNKNOWN type".to_string(),
            ));
        }

        let mut query: Vec<(&str, String)> = window.query().to_vec();
        query.extend(types.iter().map(|t| ("type", t.as_str().to_string())));

        let events = self
            .request(reqwest::Method::GET, "/events", &query, None::<&()>)
            .await?
            .map(serde_json::from_value::<Vec<AuditEvent>>)
            .transpose()?
            .unwrap_or_default();

        Ok(EventPage { window, events })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn event() -> AuditEvent {
        AuditEvent {
            time: Utc::now(),
            event_type: AuditEventType::Login,
            realm_id: None,
            client_id: None,
            user_id: None,
            session_id: None,
            ip_address: None,
            error: None,
            details: Default::default(),
        }
    }

    #[test]
    fn full_page_has_more() {
        let page = EventPage {
            window: PageWindow::new(0, 3),
            events: vec![event(), event(), event()],
        };
        assert!(page.has_more());
    }

    #[test]
    fn short_page_is_last() {
        let page = EventPage {
            window: PageWindow::new(3, 3),
            events: vec![event()],
        };
        assert!(!page.has_more());
    }
}
