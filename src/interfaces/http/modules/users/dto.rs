//! User DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    CreateUserDto, DepartmentRef, UpdateUserDto, User, UserDetails, UserFilter, UserRole,
    UserStatus,
};

/// Department reference inside a user profile
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DepartmentRefDto {
    pub id: i32,
    pub name: String,
}

impl From<DepartmentRef> for DepartmentRefDto {
    fn from(d: DepartmentRef) -> Self {
        Self {
            id: d.id,
            name: d.name,
        }
    }
}

/// User API representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub telephone: Option<String>,
    pub manager_id: Option<i32>,
    /// member-of
    pub departments: Vec<DepartmentRefDto>,
    /// manager-of
    pub managed_departments: Vec<DepartmentRefDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserDetails> for UserDto {
    fn from(d: UserDetails) -> Self {
        let u = d.user;
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            role: u.role,
            status: u.status,
            telephone: u.telephone,
            manager_id: u.manager_id,
            departments: d.departments.into_iter().map(Into::into).collect(),
            managed_departments: d
                .managed_departments
                .into_iter()
                .map(Into::into)
                .collect(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Entry of the manager picker
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManagerDto {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<User> for ManagerDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
        }
    }
}

/// Create user request. The account starts with the default password.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    pub telephone: Option<String>,
    pub manager_id: Option<i32>,
    #[serde(default)]
    pub department_ids: Vec<i32>,
}

impl From<CreateUserRequest> for CreateUserDto {
    fn from(r: CreateUserRequest) -> Self {
        Self {
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            role: r.role,
            telephone: r.telephone,
            manager_id: r.manager_id,
            department_ids: r.department_ids,
        }
    }
}

/// Partial user update. Non-administrators may only send `firstName`,
/// `lastName` and `telephone`; an empty `telephone` clears it.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub manager_id: Option<i32>,
    #[serde(default)]
    pub clear_manager: bool,
    pub department_ids: Option<Vec<i32>>,
}

impl From<UpdateUserRequest> for UpdateUserDto {
    fn from(r: UpdateUserRequest) -> Self {
        Self {
            first_name: r.first_name,
            last_name: r.last_name,
            telephone: r.telephone,
            email: r.email,
            role: r.role,
            status: r.status,
            manager_id: r.manager_id,
            clear_manager: r.clear_manager,
            department_ids: r.department_ids,
        }
    }
}

/// Replace a user's department memberships
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignDepartmentsRequest {
    pub department_ids: Vec<i32>,
}

/// Query parameters for the user listing
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListUsersParams {
    /// Substring of first name, last name or email
    pub search: Option<String>,
    pub role: Option<UserRole>,
}

impl From<ListUsersParams> for UserFilter {
    fn from(p: ListUsersParams) -> Self {
        Self {
            search: p.search,
            role: p.role,
        }
    }
}
