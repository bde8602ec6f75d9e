//! User roles returned by the login endpoint.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role of the logged-in user.
///
/// Admins may use the POS terminal; customers only the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Shop staff with access to the back-office and POS.
    Admin,
    /// Regular storefront customer.
    #[default]
    Cliente,
}

impl UserRole {
    /// Whether this role may operate the POS terminal.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Cliente => write!(f, "cliente"),
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "cliente" | "user" => Ok(Self::Cliente),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display_agree() {
        for role in [UserRole::Admin, UserRole::Cliente] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_only_admin_is_admin() {
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Cliente.is_admin());
    }
}
