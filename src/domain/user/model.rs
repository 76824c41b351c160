//! User domain entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DepartmentRef;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum UserRole {
    Admin,
    Manager,
    Employee,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::Employee => "Employee",
        }
    }

    /// Strict parse; unknown roles are rejected rather than downgraded.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Admin" => Some(Self::Admin),
            "Manager" => Some(Self::Manager),
            "Employee" => Some(Self::Employee),
            _ => None,
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Employee
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account status. Inactive accounts cannot sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum UserStatus {
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }
}

impl Default for UserStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// User model
#[derive(Clone, Debug)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub telephone: Option<String>,
    /// Supervising manager
    pub manager_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Lightweight reference used in department rosters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRef {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for UserRef {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
        }
    }
}

/// A user together with both sides of their department relations.
#[derive(Clone, Debug)]
pub struct UserDetails {
    pub user: User,
    /// member-of
    pub departments: Vec<DepartmentRef>,
    /// manager-of
    pub managed_departments: Vec<DepartmentRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_is_strict() {
        assert_eq!(UserRole::parse("Manager"), Some(UserRole::Manager));
        assert_eq!(UserRole::parse("manager"), None);
        assert_eq!(UserRole::parse("Owner"), None);
    }

    #[test]
    fn role_roundtrips_through_str() {
        for role in [UserRole::Admin, UserRole::Manager, UserRole::Employee] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn defaults_are_least_privileged_and_active() {
        assert_eq!(UserRole::default(), UserRole::Employee);
        assert_eq!(UserStatus::default(), UserStatus::Active);
    }
}
