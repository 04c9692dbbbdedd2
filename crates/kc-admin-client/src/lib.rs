//! # kc-admin-client
//!
//! Orchestration layer over the Keycloak Admin REST API.
//!
//! The admin API has no transactions, batch endpoints or diffing. This crate
//! provides:
//! - [`CredentialManager`]: keeps the bearer credential outside its expiry
//!   margin, coalescing concurrent refreshes
//! - [`AdminClient`]: authenticated JSON requests with classified failures
//! - [`EnrichmentFetcher`]: user pages enriched with role assignments,
//!   tolerant of per-user failures
//! - [`RoleReconciler`]: moves a user to a desired role set with at most one
//!   grant and one revoke call
//! - [`AdminClient::list_events`]: offset-paged audit events
//!
//! ## Example
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use kc_admin_client::*;
//! # async fn run(session: Arc<dyn OidcSession>) -> AdminResult<()> {
//! let config = ClientConfig::new("http://localhost:8080", "clinic");
//! let credentials = Arc::new(CredentialManager::new(session, config.refresh_margin()));
//! let client = AdminClient::new(&config, credentials)?;
//!
//! let page = EnrichmentFetcher::new(client.clone(), &config)
//!     .list_enriched(PageWindow::new(0, 20))
//!     .await?;
//! for user in &page.users {
//!     println!("{} {:?}", user.user.username, user.roles);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod credential;
pub mod dto;
pub mod enrichment;
pub mod error;
pub mod events;
pub mod page;
pub mod reconcile;
pub mod roles;
pub mod users;

pub use client::AdminClient;
pub use config::ClientConfig;
pub use credential::{Credential, CredentialManager, OidcSession, SessionError};
pub use dto::{
    AuditEvent, AuditEventType, NewUser, PasswordReset, RoleRef, RoleRepresentation,
    UserRepresentation,
};
pub use enrichment::{
    EnrichedPage, EnrichedUser, EnrichmentFetcher, EnrichmentWarning, NoiseFilter,
};
pub use error::{AdminError, AdminResult, ReconcileStep};
pub use events::EventPage;
pub use page::PageWindow;
pub use reconcile::{ReconcileOutcome, ReconcilePlan, RoleReconciler, UnknownRolePolicy};
pub use roles::RoleCatalog;
