//! Caller identity
//!
//! The authenticated actor behind a request. Supplied explicitly to every
//! core operation; nothing reads it from ambient state.

use super::{User, UserRole};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub id: i32,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
}

impl CallerIdentity {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn is_self(&self, user_id: i32) -> bool {
        self.id == user_id
    }
}

impl From<&User> for CallerIdentity {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            role: u.role,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
        }
    }
}
