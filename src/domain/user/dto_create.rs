use validator::Validate;

use super::UserRole;
use crate::shared::{normalize_email, normalize_optional};

/// Fields an administrator supplies when creating an account.
///
/// The password is not part of the request: new accounts get the
/// configured default password.
#[derive(Debug, Clone, Validate)]
pub struct CreateUserDto {
    #[validate(length(min = 1, max = 100, message = "first name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "last name is required"))]
    pub last_name: String,
    #[validate(email(message = "invalid email format"))]
    pub email: String,
    pub role: UserRole,
    #[validate(length(max = 32, message = "telephone must be at most 32 characters"))]
    pub telephone: Option<String>,
    pub manager_id: Option<i32>,
    /// Initial member-of set
    pub department_ids: Vec<i32>,
}

impl CreateUserDto {
    /// Trimmed names, normalized email, blank telephone dropped. Validation
    /// runs on the result.
    pub fn normalized(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: normalize_email(&self.email),
            telephone: normalize_optional(self.telephone),
            ..self
        }
    }
}

/// Persistence-level insert, produced by the service after hashing.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub telephone: Option<String>,
    pub manager_id: Option<i32>,
    pub department_ids: Vec<i32>,
}
