//! Common test utilities and fixtures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kc_admin_client::{
    AdminClient, ClientConfig, Credential, CredentialManager, OidcSession, SessionError,
};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const REALM: &str = "clinic";
pub const TOKEN: &str = "test-token";

/// Session that hands out a fixed token, or always fails.
pub struct StubSession {
    server_url: String,
    fail: bool,
    pub refreshes: AtomicUsize,
}

#[async_trait]
impl OidcSession for StubSession {
    fn realm(&self) -> &str {
        REALM
    }

    fn auth_server_url(&self) -> &str {
        &self.server_url
    }

    fn token(&self) -> Option<Credential> {
        None
    }

    async fn update_token(&self, _min_validity: Duration) -> Result<Credential, SessionError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(SessionError::new("refresh token revoked"));
        }
        Ok(Credential::expiring_in(TOKEN, Duration::from_secs(300)))
    }
}

/// Mock server plus a client pointed at it.
pub struct TestEnv {
    pub server: MockServer,
    pub config: ClientConfig,
    pub session: Arc<StubSession>,
    pub client: AdminClient,
}

impl TestEnv {
    /// Creates an environment whose session always refreshes successfully.
    pub async fn new() -> Self {
        Self::build(false).await
    }

    /// Creates an environment whose session can never refresh.
    pub async fn with_failing_session() -> Self {
        Self::build(true).await
    }

    async fn build(fail: bool) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("kc_admin_client=debug")
            .with_test_writer()
            .try_init();

        let server = MockServer::start().await;
        let mut config = ClientConfig::new(server.uri(), REALM);
        config.enrichment_concurrency = 2;

        let session = Arc::new(StubSession {
            server_url: server.uri(),
            fail,
            refreshes: AtomicUsize::new(0),
        });
        let credentials = Arc::new(CredentialManager::new(
            session.clone(),
            config.refresh_margin(),
        ));
        let client = AdminClient::new(&config, credentials).expect("client builds");

        Self {
            server,
            config,
            session,
            client,
        }
    }

    /// Full mock path for an admin endpoint.
    pub fn path(&self, suffix: &str) -> String {
        format!("/admin/realms/{REALM}{suffix}")
    }
}

/// A user as the server lists it.
pub fn user_json(id: &str, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": format!("{username}@example.com"),
        "enabled": true,
        "emailVerified": true,
        "createdTimestamp": 1_700_000_000_000_u64
    })
}

/// A realm role as the server lists it.
pub fn role_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "composite": false,
        "clientRole": false,
        "containerId": REALM
    })
}

/// The clinic catalog: doctor=r1, admin=r2, nurse=r3.
pub fn catalog_json() -> Value {
    json!([
        role_json("r1", "doctor"),
        role_json("r2", "admin"),
        role_json("r3", "nurse")
    ])
}
