//! Direct-grant login session against the realm's token endpoint.
//!
//! The administrator logs in once with the password grant; later updates use
//! the refresh token. The password itself is not kept.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kc_admin_client::{Credential, OidcSession, SessionError};
use parking_lot::Mutex;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::AuthConfig;
use crate::{CliError, CliResult};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
    refresh_token: Option<String>,
    refresh_expires_in: Option<u64>,
}

#[derive(Default)]
struct Tokens {
    access: Option<Credential>,
    refresh: Option<(String, Option<DateTime<Utc>>)>,
}

impl Tokens {
    fn store(&mut self, response: TokenResponse) -> Credential {
        let access = Credential::expiring_in(
            response.access_token,
            Duration::from_secs(response.expires_in),
        );
        self.access = Some(access.clone());
        if let Some(token) = response.refresh_token {
            // 0 means the refresh token lives as long as the SSO session
            let expires_at = response
                .refresh_expires_in
                .filter(|secs| *secs > 0)
                .and_then(|secs| chrono::Duration::from_std(Duration::from_secs(secs)).ok())
                .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));
            self.refresh = Some((token, expires_at));
        }
        access
    }

    fn usable_refresh_token(&self) -> Option<String> {
        match &self.refresh {
            Some((token, None)) => Some(token.clone()),
            Some((token, Some(expires_at))) if Utc::now() < *expires_at => Some(token.clone()),
            _ => None,
        }
    }
}

/// Session established with the OpenID Connect direct grant.
pub struct KeycloakSession {
    http: reqwest::Client,
    server_url: String,
    auth: AuthConfig,
    tokens: Mutex<Tokens>,
}

impl KeycloakSession {
    /// Logs in with username and password.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Auth`] if the server rejects the credentials.
    #[instrument(skip(password, auth), fields(realm = %auth.realm, client_id = %auth.client_id))]
    pub async fn login(
        server_url: &str,
        auth: AuthConfig,
        username: &str,
        password: &str,
    ) -> CliResult<Self> {
        let session = Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()?,
            server_url: server_url.trim_end_matches('/').to_string(),
            auth,
            tokens: Mutex::new(Tokens::default()),
        };

        let response = session
            .grant(&[("grant_type", "password"), ("username", username), ("password", password)])
            .await
            .map_err(CliError::Auth)?;
        session.tokens.lock().store(response);
        debug!("logged in");
        Ok(session)
    }

    fn token_endpoint(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.server_url,
            urlencoding::encode(&self.auth.realm)
        )
    }

    async fn grant(&self, params: &[(&str, &str)]) -> Result<TokenResponse, String> {
        let mut form: Vec<(&str, &str)> = vec![("client_id", self.auth.client_id.as_str())];
        if let Some(secret) = &self.auth.client_secret {
            form.push(("client_secret", secret.as_str()));
        }
        form.extend_from_slice(params);

        let response = self
            .http
            .post(self.token_endpoint())
            .form(&form)
            .send()
            .await
            .map_err(|e| format!("token request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("token endpoint returned {}: {}", status.as_u16(), body.trim()));
        }
        response
            .json()
            .await
            .map_err(|e| format!("unreadable token response: {e}"))
    }
}

#[async_trait]
impl OidcSession for KeycloakSession {
    fn realm(&self) -> &str {
        &self.auth.realm
    }

    fn auth_server_url(&self) -> &str {
        &self.server_url
    }

    fn token(&self) -> Option<Credential> {
        self.tokens.lock().access.clone()
    }

    async fn update_token(&self, min_validity: Duration) -> Result<Credential, SessionError> {
        let refresh_token = {
            let tokens = self.tokens.lock();
            if let Some(access) = tokens.access.as_ref().filter(|c| c.is_fresh(min_validity)) {
                return Ok(access.clone());
            }
            tokens
                .usable_refresh_token()
                .ok_or_else(|| SessionError::new("session expired, log in again"))?
        };

        debug!("refreshing access token");
        let response = self
            .grant(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token.as_str())])
            .await
            .map_err(SessionError::new)?;
        Ok(self.tokens.lock().store(response))
    }
}

impl std::fmt::Debug for KeycloakSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeycloakSession")
            .field("server_url", &self.server_url)
            .field("realm", &self.auth.realm)
            .field("client_id", &self.auth.client_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const TOKEN_PATH: &str = "/realms/master/protocol/openid-connect/token";

    async fn login(server: &MockServer) -> KeycloakSession {
        KeycloakSession::login(&server.uri(), AuthConfig::default(), "admin", "s3cret")
            .await
            .unwrap()
    }

    fn token_body(access: &str, expires_in: u64) -> serde_json::Value {
        json!({
            "access_token": access,
            "expires_in": expires_in,
            "refresh_token": format!("refresh-{access}"),
            "refresh_expires_in": 1800,
            "token_type": "Bearer"
        })
    }

    #[tokio::test]
    async fn login_uses_password_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(body_string_contains("grant_type=password"))
            .and(body_string_contains("client_id=admin-cli"))
            .and(body_string_contains("username=admin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("a1", 300)))
            .expect(1)
            .mount(&server)
            .await;

        let session = login(&server).await;
        assert_eq!(session.token().unwrap().token(), "a1");

        // still fresh: no second request
        let again = session.update_token(Duration::from_secs(30)).await.unwrap();
        assert_eq!(again.token(), "a1");
    }

    #[tokio::test]
    async fn rejected_login_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_grant"}"#),
            )
            .mount(&server)
            .await;

        let result =
            KeycloakSession::login(&server.uri(), AuthConfig::default(), "admin", "wrong").await;
        match result {
            Err(CliError::Auth(message)) => assert!(message.contains("401")),
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn short_lived_token_is_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(body_string_contains("grant_type=password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("a1", 5)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("a2", 300)))
            .expect(1)
            .mount(&server)
            .await;

        let session = login(&server).await;
        let refreshed = session.update_token(Duration::from_secs(30)).await.unwrap();
        assert_eq!(refreshed.token(), "a2");
        assert_eq!(session.token().unwrap().token(), "a2");
    }

    #[tokio::test]
    async fn missing_refresh_token_fails_update() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "a1", "expires_in": 5})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = login(&server).await;
        let err = session.update_token(Duration::from_secs(30)).await.unwrap_err();
        assert!(err.to_string().contains("log in again"));
    }
}
