//! User DTOs.

use serde::{Deserialize, Serialize};

/// A user as returned by `GET /users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRepresentation {
    /// Server-assigned identifier.
    pub id: String,
    /// Username (unique within the realm).
    pub username: String,
    /// Email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// First name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Whether the account can log in.
    #[serde(default)]
    pub enabled: bool,
    /// Whether the email address has been verified.
    #[serde(default)]
    pub email_verified: bool,
}

impl UserRepresentation {
    /// Full name when one is set, otherwise the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            self.username.clone()
        } else {
            parts.join(" ")
        }
    }
}

/// Body of `POST /users`.
///
/// The server does not echo the new identifier back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    /// Username.
    pub username: String,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Whether the account starts enabled.
    pub enabled: bool,
    /// Whether the email counts as verified.
    pub email_verified: bool,
}

impl NewUser {
    /// An enabled user with no email.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: None,
            enabled: true,
            email_verified: false,
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the enabled flag.
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the email-verified flag.
    #[must_use]
    pub const fn email_verified(mut self, verified: bool) -> Self {
        self.email_verified = verified;
        self
    }
}

/// Body of `PUT /users/{id}/reset-password`.
#[derive(Clone, Serialize)]
pub struct PasswordReset {
    #[serde(rename = "type")]
    credential_type: &'static str,
    value: String,
    temporary: bool,
}

impl PasswordReset {
    /// A permanent password.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            credential_type: "password",
            value: value.into(),
            temporary: false,
        }
    }

    /// Requires the user to change the password at next login.
    #[must_use]
    pub const fn temporary(mut self, temporary: bool) -> Self {
        self.temporary = temporary;
        self
    }
}

impl std::fmt::Debug for PasswordReset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordReset")
            .field("value", &"<redacted>")
            .field("temporary", &self.temporary)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_deserializes_from_camel_case() {
        let user: UserRepresentation = serde_json::from_str(
            r#"{"id":"u1","username":"jdoe","firstName":"Jane","lastName":"Doe",
                "email":"jane@example.com","enabled":true,"emailVerified":false,
                "createdTimestamp":1700000000000}"#,
        )
        .unwrap();
        assert_eq!(user.first_name.as_deref(), Some("Jane"));
        assert_eq!(user.display_name(), "Jane Doe");
    }

    #[test]
    fn display_name_falls_back_to_username() {
        let user: UserRepresentation =
            serde_json::from_str(r#"{"id":"u1","username":"svc","firstName":" "}"#).unwrap();
        assert_eq!(user.display_name(), "svc");
        assert!(!user.enabled);
    }

    #[test]
    fn new_user_body_matches_create_contract() {
        let body = serde_json::to_value(NewUser::new("jdoe").email("j@example.com")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "username": "jdoe",
                "email": "j@example.com",
                "enabled": true,
                "emailVerified": false
            })
        );
    }

    #[test]
    fn password_reset_is_permanent_by_default() {
        let body = serde_json::to_value(PasswordReset::new("s3cret")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"type": "password", "value": "s3cret", "temporary": false})
        );
        assert!(!format!("{:?}", PasswordReset::new("s3cret")).contains("s3cret"));
    }
}
