//! # Identity Enumerations
//!
//! Enumerations shared by the gateway and the identity backends. Numeric
//! discriminants are the values carried on the wire (bus records, RPC
//! messages and JSON bodies).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Failed conversion from a wire value into an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnumError {
    /// Numeric discriminant outside the known range.
    #[error("unknown {kind} value: {value}")]
    UnknownValue { kind: &'static str, value: i64 },

    /// String tag that matches no variant.
    #[error("unknown {kind} tag: {tag}")]
    UnknownTag { kind: &'static str, tag: String },
}

/// Kind of session carried by a token. Determines the token lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionType {
    /// Interactive user session (short-lived).
    #[default]
    User,
    /// Service-to-service integration session (long-lived).
    Integration,
    /// Any other session kind; gets the minimal default lifetime.
    Unspecified,
}

impl SessionType {
    /// Tag written into the `token_type` claim.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::User => "USER",
            SessionType::Integration => "INTEGRATION",
            SessionType::Unspecified => "UNSPECIFIED",
        }
    }

    /// Parse a `token_type` claim. Unknown tags become `Unspecified`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "USER" => SessionType::User,
            "INTEGRATION" => SessionType::Integration,
            _ => SessionType::Unspecified,
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Permission level. `Member < Admin < Root`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i64")]
pub enum Role {
    #[default]
    Member = 1,
    Admin = 2,
    Root = 3,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "MEMBER",
            Role::Admin => "ADMIN",
            Role::Root => "ROOT",
        }
    }
}

impl TryFrom<i64> for Role {
    type Error = EnumError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Role::Member),
            2 => Ok(Role::Admin),
            3 => Ok(Role::Root),
            _ => Err(EnumError::UnknownValue {
                kind: "role",
                value,
            }),
        }
    }
}

impl From<Role> for i64 {
    fn from(role: Role) -> Self {
        role as i64
    }
}

impl FromStr for Role {
    type Err = EnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "MEMBER" => Ok(Role::Member),
            "ADMIN" => Ok(Role::Admin),
            "ROOT" => Ok(Role::Root),
            _ => Err(EnumError::UnknownTag {
                kind: "role",
                tag: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a group membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum MembershipStatus {
    #[default]
    Active = 1,
    Disabled = 2,
    Deleted = 3,
    Pending = 4,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "ACTIVE",
            MembershipStatus::Disabled => "DISABLED",
            MembershipStatus::Deleted => "DELETED",
            MembershipStatus::Pending => "PENDING",
        }
    }
}

impl TryFrom<i64> for MembershipStatus {
    type Error = EnumError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(MembershipStatus::Active),
            2 => Ok(MembershipStatus::Disabled),
            3 => Ok(MembershipStatus::Deleted),
            4 => Ok(MembershipStatus::Pending),
            _ => Err(EnumError::UnknownValue {
                kind: "membership status",
                value,
            }),
        }
    }
}

impl From<MembershipStatus> for i64 {
    fn from(status: MembershipStatus) -> Self {
        status as i64
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a `Validate` query checks: a bearer token or a password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationType {
    Token = 1,
    Password = 2,
}

impl ValidationType {
    pub fn as_i64(&self) -> i64 {
        *self as i64
    }
}

impl TryFrom<i64> for ValidationType {
    type Error = EnumError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ValidationType::Token),
            2 => Ok(ValidationType::Password),
            _ => Err(EnumError::UnknownValue {
                kind: "validation type",
                value,
            }),
        }
    }
}
