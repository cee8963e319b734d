//! Issuance roles within a chain report

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a figure on a chain means
///
/// Ordered minted, unreleased, then bridge roles alphabetically, which is the
/// order reports list them in before sorting by amount.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Native issuance on the token's home chain
    Minted,
    /// Issued but escrowed or reserved, not circulating
    Unreleased,
    /// Copy of supply originally issued on the named chain
    BridgedFrom(String),
}

impl Role {
    pub const MINTED: &'static str = "minted";
    pub const UNRELEASED: &'static str = "unreleased";

    pub fn bridged_from(origin: impl Into<String>) -> Self {
        Role::BridgedFrom(origin.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Minted => Self::MINTED,
            Role::Unreleased => Self::UNRELEASED,
            Role::BridgedFrom(origin) => origin,
        }
    }

    /// Origin chain for bridge roles
    pub fn origin(&self) -> Option<&str> {
        match self {
            Role::BridgedFrom(origin) => Some(origin),
            _ => None,
        }
    }

    pub fn is_bridge(&self) -> bool {
        matches!(self, Role::BridgedFrom(_))
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            Self::MINTED => Role::Minted,
            Self::UNRELEASED => Role::Unreleased,
            _ => Role::BridgedFrom(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::BridgedFrom(origin) => origin,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
