use validator::Validate;

use super::DepartmentDetails;

#[derive(Debug, Clone, Validate)]
pub struct CreateDepartmentDto {
    #[validate(length(min = 1, max = 100, message = "department name is required"))]
    pub name: String,
    pub manager_ids: Vec<i32>,
    pub employee_ids: Vec<i32>,
}

#[derive(Debug, Clone, Validate)]
pub struct UpdateDepartmentDto {
    #[validate(length(min = 1, max = 100, message = "department name is required"))]
    pub name: String,
    /// Replacement manager-of set
    pub manager_ids: Vec<i32>,
    /// Users to take off the roster, typically confirmed former managers
    pub removal_ids: Vec<i32>,
    /// Users to add to the roster
    pub employee_ids: Vec<i32>,
}

/// Result of a department update.
#[derive(Debug, Clone)]
pub struct DepartmentUpdateOutcome {
    pub department: DepartmentDetails,
    /// Former managers no longer in the manager set
    pub removed_managers: Vec<i32>,
    /// Former managers that remain members; candidates for a follow-up
    /// removal once the caller confirms
    pub retained_members: Vec<i32>,
}
