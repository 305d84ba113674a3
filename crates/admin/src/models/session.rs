//! Session-stored admin identity.
//!
//! The login flow lives in a separate auth service that writes
//! [`CurrentAdmin`] into the shared `admin.session` table. This crate only
//! reads it.

use serde::{Deserialize, Serialize};

use shopping_core::{AdminRole, AdminUserId};

/// Minimal data stored in the session to identify the logged-in admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's database ID.
    pub id: AdminUserId,
    /// Admin's email address.
    pub email: String,
    /// Admin's display name.
    pub name: String,
    /// Admin's role/permission level.
    pub role: AdminRole,
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
