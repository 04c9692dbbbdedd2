//! Role DTOs.

use serde::{Deserialize, Serialize};

/// A realm role as returned by `GET /roles`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRepresentation {
    /// Server-assigned identifier.
    pub id: String,
    /// Role name, unique within the realm.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether this is a composite role.
    #[serde(default)]
    pub composite: bool,
    /// Whether this is a client role.
    #[serde(default)]
    pub client_role: bool,
}

impl RoleRepresentation {
    /// The identifier+name pair the mapping endpoints expect.
    #[must_use]
    pub fn to_ref(&self) -> RoleRef {
        RoleRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Element of a role-mapping request body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleRef {
    /// Role identifier.
    pub id: String,
    /// Role name.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_body_carries_only_id_and_name() {
        let role: RoleRepresentation = serde_json::from_str(
            r#"{"id":"r2","name":"admin","description":"Administrators","composite":false,
                "clientRole":false,"containerId":"realm-1"}"#,
        )
        .unwrap();
        let body = serde_json::to_value(vec![role.to_ref()]).unwrap();
        assert_eq!(body, serde_json::json!([{"id": "r2", "name": "admin"}]));
    }
}
