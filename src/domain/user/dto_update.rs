use validator::Validate;

use super::{UserRole, UserStatus};
use crate::shared::normalize_email;

/// Partial update of a user. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateUserDto {
    // Self-editable
    #[validate(length(min = 1, max = 100, message = "first name must not be empty"))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "last name must not be empty"))]
    pub last_name: Option<String>,
    /// Empty string clears the telephone number.
    #[validate(length(max = 32, message = "telephone must be at most 32 characters"))]
    pub telephone: Option<String>,

    // Admin-only
    #[validate(email(message = "invalid email format"))]
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub manager_id: Option<i32>,
    pub clear_manager: bool,
    /// Replaces member-of
    pub department_ids: Option<Vec<i32>>,
}

impl UpdateUserDto {
    /// Names of admin-only fields present in this update.
    pub fn admin_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.email.is_some() {
            fields.push("email");
        }
        if self.role.is_some() {
            fields.push("role");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.manager_id.is_some() || self.clear_manager {
            fields.push("manager_id");
        }
        if self.department_ids.is_some() {
            fields.push("department_ids");
        }
        fields
    }

    /// Trimmed names and telephone, normalized email. A telephone that trims
    /// to `""` still means "clear".
    pub fn normalized(self) -> Self {
        Self {
            first_name: self.first_name.map(|s| s.trim().to_string()),
            last_name: self.last_name.map(|s| s.trim().to_string()),
            telephone: self.telephone.map(|t| t.trim().to_string()),
            email: self.email.as_deref().map(normalize_email),
            ..self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.telephone.is_none()
            && self.admin_fields().is_empty()
    }
}

/// Column-level changes handed to the repository.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `Some(None)` clears the column.
    pub telephone: Option<Option<String>>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    /// `Some(None)` clears the column.
    pub manager_id: Option<Option<i32>>,
    pub department_ids: Option<Vec<i32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_fields_are_not_admin_fields() {
        let dto = UpdateUserDto {
            first_name: Some("Ana".into()),
            telephone: Some("555".into()),
            ..Default::default()
        };
        assert!(dto.admin_fields().is_empty());
        assert!(!dto.is_empty());
    }

    #[test]
    fn clearing_manager_counts_as_admin_field() {
        let dto = UpdateUserDto {
            clear_manager: true,
            role: Some(UserRole::Manager),
            ..Default::default()
        };
        assert_eq!(dto.admin_fields(), vec!["role", "manager_id"]);
    }

    #[test]
    fn normalized_trims_before_validation() {
        let dto = UpdateUserDto {
            first_name: Some("  Ana ".into()),
            telephone: Some("   ".into()),
            email: Some(" Ana@Example.COM ".into()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(dto.first_name.as_deref(), Some("Ana"));
        assert_eq!(dto.telephone.as_deref(), Some(""));
        assert_eq!(dto.email.as_deref(), Some("ana@example.com"));
    }

    #[test]
    fn default_update_is_empty() {
        assert!(UpdateUserDto::default().is_empty());
    }
}
