//! Audit event DTOs.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event type tags exposed to the event viewer.
///
/// Types outside this vocabulary deserialize to [`AuditEventType::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEventType {
    /// Successful login.
    Login,
    /// Failed login.
    LoginError,
    /// Logout.
    Logout,
    /// Failed logout.
    LogoutError,
    /// Self-registration.
    Register,
    /// Failed self-registration.
    RegisterError,
    /// Authorization code exchanged for tokens.
    CodeToToken,
    /// Failed code exchange.
    CodeToTokenError,
    /// Token refresh.
    RefreshToken,
    /// Failed token refresh.
    RefreshTokenError,
    /// Client credentials login.
    ClientLogin,
    /// Failed client credentials login.
    ClientLoginError,
    /// Password changed.
    UpdatePassword,
    /// Failed password change.
    UpdatePasswordError,
    /// Password reset.
    ResetPassword,
    /// Failed password reset.
    ResetPasswordError,
    /// Profile updated.
    UpdateProfile,
    /// Any type outside this vocabulary.
    #[serde(other)]
    Unknown,
}

impl AuditEventType {
    /// All filterable types.
    pub const ALL: [Self; 17] = [
        Self::Login,
        Self::LoginError,
        Self::Logout,
        Self::LogoutError,
        Self::Register,
        Self::RegisterError,
        Self::CodeToToken,
        Self::CodeToTokenError,
        Self::RefreshToken,
        Self::RefreshTokenError,
        Self::ClientLogin,
        Self::ClientLoginError,
        Self::UpdatePassword,
        Self::UpdatePasswordError,
        Self::ResetPassword,
        Self::ResetPasswordError,
        Self::UpdateProfile,
    ];

    /// Wire tag, as used in the `type` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::LoginError => "LOGIN_ERROR",
            Self::Logout => "LOGOUT",
            Self::LogoutError => "LOGOUT_ERROR",
            Self::Register => "REGISTER",
            Self::RegisterError => "REGISTER_ERROR",
            Self::CodeToToken => "CODE_TO_TOKEN",
            Self::CodeToTokenError => "CODE_TO_TOKEN_ERROR",
            Self::RefreshToken => "REFRESH_TOKEN",
            Self::RefreshTokenError => "REFRESH_TOKEN_ERROR",
            Self::ClientLogin => "CLIENT_LOGIN",
            Self::ClientLoginError => "CLIENT_LOGIN_ERROR",
            Self::UpdatePassword => "UPDATE_PASSWORD",
            Self::UpdatePasswordError => "UPDATE_PASSWORD_ERROR",
            Self::ResetPassword => "RESET_PASSWORD",
            Self::ResetPasswordError => "RESET_PASSWORD_ERROR",
            Self::UpdateProfile => "UPDATE_PROFILE",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Returns true for the `*_ERROR` variants.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(
            self,
            Self::LoginError
                | Self::LogoutError
                | Self::RegisterError
                | Self::CodeToTokenError
                | Self::RefreshTokenError
                | Self::ClientLoginError
                | Self::UpdatePasswordError
                | Self::ResetPasswordError
        )
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| format!("unknown event type: {s}"))
    }
}

/// A user event from `GET /events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    /// When the event happened.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,
    /// Type tag.
    #[serde(rename = "type")]
    pub event_type: AuditEventType,
    /// Realm the event belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm_id: Option<String>,
    /// Client the event was raised through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Acting user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Session the event belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Source IP address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Error code for failure events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Free-form details.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub details: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_deserializes_with_millisecond_time() {
        let event: AuditEvent = serde_json::from_str(
            r#"{"time":1700000000123,"type":"LOGIN_ERROR","realmId":"clinic",
                "clientId":"console","userId":"u1","ipAddress":"10.0.0.7",
                "error":"invalid_user_credentials","details":{"username":"jdoe"}}"#,
        )
        .unwrap();
        assert_eq!(event.event_type, AuditEventType::LoginError);
        assert_eq!(event.time.timestamp_millis(), 1_700_000_000_123);
        assert_eq!(event.error.as_deref(), Some("invalid_user_credentials"));
        assert_eq!(event.details.get("username").map(String::as_str), Some("jdoe"));
    }

    #[test]
    fn unknown_type_does_not_fail_the_page() {
        let event: AuditEvent =
            serde_json::from_str(r#"{"time":0,"type":"IMPERSONATE"}"#).unwrap();
        assert_eq!(event.event_type, AuditEventType::Unknown);
    }

    #[test]
    fn type_parses_from_cli_spelling() {
        assert_eq!("login-error".parse::<AuditEventType>(), Ok(AuditEventType::LoginError));
        assert_eq!("LOGOUT".parse::<AuditEventType>(), Ok(AuditEventType::Logout));
        assert!("unknown".parse::<AuditEventType>().is_err());
        assert!(AuditEventType::CodeToTokenError.is_error());
    }
}
