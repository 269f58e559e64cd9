//! Roles a user can enter the dashboard as.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FlowError;

/// The fixed set of dashboard roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Employee,
    Donor,
    Admin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Student, Role::Employee, Role::Donor, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Employee => "employee",
            Self::Donor => "donor",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = FlowError;

    /// Unknown identifiers are rejected rather than mapped to a default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| FlowError::InvalidRole(s.to_string()))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
