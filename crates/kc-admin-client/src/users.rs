//! User endpoints.

use reqwest::Method;
use tracing::{debug, instrument};

use crate::client::{segment, AdminClient};
use crate::dto::{NewUser, PasswordReset, UserRepresentation};
use crate::error::{AdminError, AdminResult};
use crate::page::PageWindow;

impl AdminClient {
    /// `GET /users?first=&max=`: one window of users in server order.
    ///
    /// # Errors
    ///
    /// Propagates classified request failures.
    pub async fn list_users(&self, window: PageWindow) -> AdminResult<Vec<UserRepresentation>> {
        self.get("/users", &window.query()).await
    }

    /// `GET /users/count`: size of the whole collection.
    ///
    /// The server answers with a bare or a quoted number.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::UnexpectedResponse`] if the body holds no
    /// number, and propagates classified request failures.
    pub async fn count_users(&self) -> AdminResult<u64> {
        let (_, body) = self
            .execute(Method::GET, "/users/count", &[], None::<&()>)
            .await?;
        parse_count(&body).ok_or_else(|| {
            AdminError::UnexpectedResponse(format!(
                "user count is not a number: {}",
                String::from_utf8_lossy(&body)
            ))
        })
    }

    /// Exact-match username lookup.
    ///
    /// # Errors
    ///
    /// Propagates classified request failures.
    pub async fn find_user_by_username(
        &self,
        username: &str,
    ) -> AdminResult<Option<UserRepresentation>> {
        let users: Vec<UserRepresentation> = self
            .get(
                "/users",
                &[
                    ("username", username.to_string()),
                    ("exact", "true".to_string()),
                ],
            )
            .await?;
        // older servers ignore `exact`
        Ok(users
            .into_iter()
            .find(|u| u.username.eq_ignore_ascii_case(username)))
    }

    /// Creates a user and returns it with its server-assigned id.
    ///
    /// The create endpoint does not echo the id, so the user is looked up
    /// by username afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::Conflict`] for a duplicate username and
    /// [`AdminError::NotFound`] if the created user cannot be found again.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn create_user(&self, user: &NewUser) -> AdminResult<UserRepresentation> {
        self.send(Method::POST, "/users", user).await?;
        debug!("user created, resolving id");

        self.find_user_by_username(&user.username)
            .await?
            .ok_or_else(|| AdminError::NotFound {
                path: format!("/users?username={}", user.username),
            })
    }

    /// `PUT /users/{id}/reset-password`.
    ///
    /// # Errors
    ///
    /// Propagates classified request failures.
    #[instrument(skip(self, reset))]
    pub async fn reset_password(&self, user_id: &str, reset: &PasswordReset) -> AdminResult<()> {
        let path = format!("/users/{}/reset-password", segment(user_id));
        self.send(Method::PUT, &path, reset).await
    }
}

/// Reads `42`, `"42"` or ` 42\n`.
fn parse_count(body: &[u8]) -> Option<u64> {
    let text = std::str::from_utf8(body).ok()?.trim();
    let unquoted = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    unquoted.trim().parse().ok()
}
