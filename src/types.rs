use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Numeric user identifier from the backing user table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Authorization level of a staff account.
///
/// Closed set: `Owner` and `Admin` are elevated and pass the access guard,
/// `Member` is not. Any unrecognized wire value deserializes to `Member`,
/// so an unexpected permission string fails closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Permission {
    Owner,
    Admin,
    Member,
}

impl Permission {
    /// Whether this level is permitted past the access guard.
    #[must_use]
    pub fn is_elevated(self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::Admin => "Admin",
            Self::Member => "Member",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Permission {
    fn from(s: &str) -> Self {
        match s {
            "Owner" => Self::Owner,
            "Admin" => Self::Admin,
            _ => Self::Member,
        }
    }
}

impl From<String> for Permission {
    fn from(s: String) -> Self {
        s.as_str().into()
    }
}

impl From<Permission> for String {
    fn from(p: Permission) -> Self {
        p.as_str().to_owned()
    }
}

/// Validated email address (recipient shape check).
///
/// Guaranteed valid by construction: holding an `EmailAddress` proves the
/// value has a non-empty local part, a single `@`, a dotted domain, and no
/// whitespace. Use `"ops@example.com".parse::<EmailAddress>()` or
/// `EmailAddress::try_from(string)` to create.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for EmailAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if is_valid_shape(&s) {
            Ok(Self(s))
        } else {
            Err(Error::InvalidEmail(s))
        }
    }
}

impl From<EmailAddress> for String {
    fn from(a: EmailAddress) -> Self {
        a.0
    }
}

fn is_valid_shape(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    // Dotted domain with non-empty labels on both sides of some dot.
    domain
        .split_once('.')
        .is_some_and(|(head, tail)| !head.is_empty() && !tail.is_empty())
}
