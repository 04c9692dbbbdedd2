//! Authenticated request layer for the realm admin endpoints.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::config::ClientConfig;
use crate::credential::CredentialManager;
use crate::error::{AdminError, AdminResult};

/// Query string pairs; repeated keys are sent repeatedly.
pub type Query<'a> = &'a [(&'a str, String)];

/// Typed client for `{server}/admin/realms/{realm}`.
///
/// Every call first obtains a fresh credential from the shared
/// [`CredentialManager`]. Failures are classified, never retried.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Arc<CredentialManager>,
}

impl AdminClient {
    /// Creates a client for the configured realm.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ClientConfig, credentials: Arc<CredentialManager>) -> AdminResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.admin_base_url(),
            credentials,
        })
    }

    /// Realm admin base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The credential manager shared by this client.
    #[must_use]
    pub fn credentials(&self) -> &Arc<CredentialManager> {
        &self.credentials
    }

    /// Issues a request and returns the parsed JSON body.
    ///
    /// A 204 or an empty body yields `None` without parsing.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::AuthExpired`] if no fresh credential can be
    /// obtained, a status-classified error for non-2xx responses,
    /// [`AdminError::Transport`] on connection failures and
    /// [`AdminError::Decode`] for an undecodable success body.
    pub async fn request<B>(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: Option<&B>,
    ) -> AdminResult<Option<serde_json::Value>>
    where
        B: Serialize + ?Sized,
    {
        let (status, bytes) = self.execute(method, path, query, body).await?;
        if status == StatusCode::NO_CONTENT || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// GET returning a typed body.
    ///
    /// # Errors
    ///
    /// As [`request`](Self::request); an empty body is
    /// [`AdminError::UnexpectedResponse`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: Query<'_>) -> AdminResult<T> {
        let value = self
            .request(Method::GET, path, query, None::<&()>)
            .await?
            .ok_or_else(|| AdminError::UnexpectedResponse(format!("empty body from GET {path}")))?;
        Ok(serde_json::from_value(value)?)
    }

    /// Sends a JSON body and discards any response body.
    ///
    /// # Errors
    ///
    /// As [`request`](Self::request).
    pub async fn send<B>(&self, method: Method, path: &str, body: &B) -> AdminResult<()>
    where
        B: Serialize + ?Sized,
    {
        self.execute(method, path, &[], Some(body)).await?;
        Ok(())
    }

    /// Issues a request and returns the raw success body.
    pub(crate) async fn execute<B>(
        &self,
        method: Method,
        path: &str,
        query: Query<'_>,
        body: Option<&B>,
    ) -> AdminResult<(StatusCode, Vec<u8>)>
    where
        B: Serialize + ?Sized,
    {
        let credential = self.credentials.ensure_fresh().await?;
        let url = format!("{}{}", self.base_url, path);

        debug!(%method, %path, "admin request");
        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(credential.token())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        handle_response(path, response).await
    }
}

/// Classifies a response, returning the body of a 2xx.
async fn handle_response(
    path: &str,
    response: reqwest::Response,
) -> AdminResult<(StatusCode, Vec<u8>)> {
    let status = response.status();
    debug!(%path, status = status.as_u16(), "admin response");

    if status.is_success() {
        let bytes = response.bytes().await?;
        Ok((status, bytes.to_vec()))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(AdminError::from_status(status.as_u16(), path, body))
    }
}

/// Percent-encodes one path segment.
pub(crate) fn segment(value: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(value)
}
