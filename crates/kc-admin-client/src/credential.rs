//! Bearer credential lifecycle.
//!
//! [`CredentialManager`] wraps an [`OidcSession`] and guarantees that a
//! credential handed out for a request outlives the configured safety margin.
//! Refreshes are coalesced: while one refresh is in flight every other caller
//! awaits the same shared future instead of starting its own.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::error::{AdminError, AdminResult};

/// A bearer token and the instant it stops being accepted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    expires_at: DateTime<Utc>,
}

impl Credential {
    /// Creates a credential.
    #[must_use]
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Creates a credential expiring `lifetime` from now.
    #[must_use]
    pub fn expiring_in(token: impl Into<String>, lifetime: Duration) -> Self {
        let expires_at = Utc::now()
            .checked_add_signed(to_chrono(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(token, expires_at)
    }

    /// The raw bearer token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Absolute expiry.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns true if the credential outlives `now + margin`.
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        now.checked_add_signed(to_chrono(margin))
            .is_some_and(|edge| edge < self.expires_at)
    }

    /// Returns true if the credential outlives the margin from now.
    #[must_use]
    pub fn is_fresh(&self, margin: Duration) -> bool {
        self.is_fresh_at(Utc::now(), margin)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}

/// Failure reported by an OIDC session while updating its token.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct SessionError(pub String);

impl SessionError {
    /// Creates a session error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The OIDC session owned by the login layer.
///
/// Login, redirects and token issuance live behind this trait; the admin
/// client only asks for the current token and for an update.
#[async_trait]
pub trait OidcSession: Send + Sync {
    /// Realm the session was established in.
    fn realm(&self) -> &str;

    /// Base URL of the auth server.
    fn auth_server_url(&self) -> &str;

    /// The session's current credential, if it holds one.
    fn token(&self) -> Option<Credential>;

    /// Obtains a credential valid for at least `min_validity`.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot produce a credential (network
    /// failure, revoked refresh token).
    async fn update_token(&self, min_validity: Duration) -> Result<Credential, SessionError>;
}

type PendingRefresh = Shared<BoxFuture<'static, Result<Credential, SessionError>>>;

/// A refresh in flight and the margin it was asked to satisfy.
struct InFlight {
    margin: Duration,
    refresh: PendingRefresh,
}

impl InFlight {
    fn is_done(&self) -> bool {
        self.refresh.peek().is_some()
    }
}

/// Holds the current credential and refreshes it before it gets too old.
pub struct CredentialManager {
    session: Arc<dyn OidcSession>,
    current: Arc<RwLock<Option<Credential>>>,
    pending: Mutex<Option<InFlight>>,
    margin: Duration,
}

impl CredentialManager {
    /// Creates a manager seeded with the session's current token.
    #[must_use]
    pub fn new(session: Arc<dyn OidcSession>, margin: Duration) -> Self {
        let current = session.token();
        Self {
            session,
            current: Arc::new(RwLock::new(current)),
            pending: Mutex::new(None),
            margin,
        }
    }

    /// Default safety margin.
    #[must_use]
    pub const fn margin(&self) -> Duration {
        self.margin
    }

    /// Realm of the wrapped session.
    #[must_use]
    pub fn realm(&self) -> &str {
        self.session.realm()
    }

    /// Auth server URL of the wrapped session.
    #[must_use]
    pub fn auth_server_url(&self) -> &str {
        self.session.auth_server_url()
    }

    /// Returns a credential that outlives the default margin.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::AuthExpired`] if a needed refresh fails.
    pub async fn ensure_fresh(&self) -> AdminResult<Credential> {
        self.ensure_fresh_with(self.margin).await
    }

    /// Returns a credential that outlives `margin`, refreshing first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::AuthExpired`] if the refresh fails or yields a
    /// credential that still expires inside the margin.
    pub async fn ensure_fresh_with(&self, margin: Duration) -> AdminResult<Credential> {
        let pending = {
            let mut slot = self.pending.lock();
            if let Some(credential) = self.cached(margin) {
                debug!(expires_at = %credential.expires_at, "using cached credential");
                return Ok(credential);
            }
            // a refresh asked for a narrower margin may not satisfy this caller
            match slot.as_ref().filter(|f| !f.is_done() && f.margin >= margin) {
                Some(in_flight) => {
                    debug!("joining in-flight credential refresh");
                    in_flight.refresh.clone()
                }
                None => {
                    let refresh = self.start_refresh(margin);
                    *slot = Some(InFlight {
                        margin,
                        refresh: refresh.clone(),
                    });
                    refresh
                }
            }
        };

        let result = pending.await;

        {
            let mut slot = self.pending.lock();
            if slot.as_ref().is_some_and(InFlight::is_done) {
                *slot = None;
            }
        }

        match result {
            Ok(credential) if credential.is_fresh(margin) => Ok(credential),
            Ok(credential) => Err(AdminError::AuthExpired(format!(
                "refreshed credential expires at {} inside the {}s margin",
                credential.expires_at,
                margin.as_secs()
            ))),
            Err(err) => {
                warn!(error = %err, "credential refresh failed");
                Err(AdminError::AuthExpired(err.0))
            }
        }
    }

    /// Drops the cached credential; the next call refreshes.
    pub fn invalidate(&self) {
        *self.current.write() = None;
    }

    fn cached(&self, margin: Duration) -> Option<Credential> {
        self.current
            .read()
            .as_ref()
            .filter(|c| c.is_fresh(margin))
            .cloned()
    }

    fn start_refresh(&self, margin: Duration) -> PendingRefresh {
        let session = Arc::clone(&self.session);
        let current = Arc::clone(&self.current);
        debug!(margin_secs = margin.as_secs(), "refreshing bearer credential");
        async move {
            let credential = session.update_token(margin).await?;
            let mut cached = current.write();
            if cached.as_ref().map_or(true, |c| c.expires_at < credential.expires_at) {
                *cached = Some(credential.clone());
            }
            Ok(credential)
        }
        .boxed()
        .shared()
    }
}

impl std::fmt::Debug for CredentialManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialManager")
            .field("realm", &self.session.realm())
            .field("current", &*self.current.read())
            .field("margin", &self.margin)
            .finish_non_exhaustive()
    }
}
