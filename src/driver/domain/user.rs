//! BMC user account values.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Privilege role for a BMC account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full administrative access.
    Admin,
    /// Operator access.
    User,
}

impl UserRole {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned while parsing a user role.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid role '{0}': expected \"admin\" or \"user\"")]
pub struct ParseUserRoleError(pub String);

impl TryFrom<&str> for UserRole {
    type Error = ParseUserRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(ParseUserRoleError(value.to_owned())),
        }
    }
}

/// Credentials and role for a single account operation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Login name.
    pub name: String,
    /// Password.
    pub password: String,
    /// Privilege role.
    pub role: UserRole,
}

impl UserAccount {
    /// Creates an account value.
    #[must_use]
    pub fn new(name: impl Into<String>, password: impl Into<String>, role: UserRole) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            role,
        }
    }
}

impl fmt::Debug for UserAccount {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("UserAccount")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Account as reported by a BMC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Slot or account identifier on the device.
    pub id: String,
    /// Login name.
    pub name: String,
    /// Device-specific role name, when reported.
    pub role: Option<String>,
    /// Whether the account is enabled.
    pub enabled: bool,
}
