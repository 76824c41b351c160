use super::UserRole;

/// Listing filter for the admin user table.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Substring of first name, last name or email
    pub search: Option<String>,
    pub role: Option<UserRole>,
}
