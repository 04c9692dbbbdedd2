//! Wire representations of the Admin REST API.
//!
//! Field names follow the server's camelCase JSON.

pub mod event;
pub mod role;
pub mod user;

pub use event::{AuditEvent, AuditEventType};
pub use role::{RoleRef, RoleRepresentation};
pub use user::{NewUser, PasswordReset, UserRepresentation};
