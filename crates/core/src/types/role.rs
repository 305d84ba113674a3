//! Admin roles.

use serde::{Deserialize, Serialize};

/// Admin role with different permission levels.
///
/// Roles are assigned by the external auth service and read from the
/// shared session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access to all admin features including user management.
    SuperAdmin,
    /// Full access to catalog management features.
    Admin,
    /// Read-only access to catalog data.
    Viewer,
}

impl AdminRole {
    /// Whether this role may create, edit, or delete catalog records.
    #[must_use]
    pub const fn can_manage_catalog(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

impl std::fmt::Display for AdminRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::Admin => write!(f, "admin"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_permissions() {
        assert!(AdminRole::SuperAdmin.can_manage_catalog());
        assert!(AdminRole::Admin.can_manage_catalog());
        assert!(!AdminRole::Viewer.can_manage_catalog());
    }

    #[test]
    fn test_round_trip_through_display() {
        for role in [AdminRole::SuperAdmin, AdminRole::Admin, AdminRole::Viewer] {
            assert_eq!(role.to_string().parse::<AdminRole>(), Ok(role));
        }
        assert!("owner".parse::<AdminRole>().is_err());
    }
}
