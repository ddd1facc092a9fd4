//! Authenticated user model
//!
//! Produced once by the auth guard from verified JWT claims and read,
//! never mutated, by everything downstream.

use serde::{Deserialize, Serialize};

/// Platform role carried in the access token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    SuperAdmin,
    TenantAdmin,
    Editor,
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "SUPER_ADMIN" => Ok(UserRole::SuperAdmin),
            "TENANT_ADMIN" => Ok(UserRole::TenantAdmin),
            "EDITOR" => Ok(UserRole::Editor),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::SuperAdmin => write!(f, "SUPER_ADMIN"),
            UserRole::TenantAdmin => write!(f, "TENANT_ADMIN"),
            UserRole::Editor => write!(f, "EDITOR"),
        }
    }
}

/// Authenticated user extracted from a verified access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
    /// The tenant this user belongs to; `None` for platform-level accounts
    pub tenant_id: Option<i64>,
}

impl AuthenticatedUser {
    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::SuperAdmin, UserRole::TenantAdmin, UserRole::Editor] {
            let parsed: UserRole = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("VIEWER".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_serde_wire_format() {
        let json = serde_json::to_string(&UserRole::TenantAdmin).unwrap();
        assert_eq!(json, "\"TENANT_ADMIN\"");
    }

    #[test]
    fn test_is_super_admin() {
        let user = AuthenticatedUser {
            id: 1,
            email: "root@sitefab.app".to_string(),
            role: UserRole::SuperAdmin,
            tenant_id: None,
        };
        assert!(user.is_super_admin());

        let user = AuthenticatedUser {
            id: 2,
            email: "admin@acme.com".to_string(),
            role: UserRole::TenantAdmin,
            tenant_id: Some(7),
        };
        assert!(!user.is_super_admin());
    }
}
