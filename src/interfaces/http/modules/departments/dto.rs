//! Department DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    CreateDepartmentDto, Department, DepartmentDetails, DepartmentStatus,
    DepartmentUpdateOutcome, UpdateDepartmentDto, UserRef,
};

/// Roster entry
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRefDto {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
}

impl From<UserRef> for UserRefDto {
    fn from(u: UserRef) -> Self {
        Self {
            id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
        }
    }
}

/// Department API representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentDto {
    pub id: i32,
    pub name: String,
    pub status: DepartmentStatus,
    pub members: Vec<UserRefDto>,
    pub managers: Vec<UserRefDto>,
    /// Comma-separated manager names, "N/A" when there are none
    pub manager_names: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DepartmentDetails> for DepartmentDto {
    fn from(d: DepartmentDetails) -> Self {
        let manager_names = d.manager_names();
        let dept = d.department;
        Self {
            id: dept.id,
            name: dept.name,
            status: dept.status,
            members: d.members.into_iter().map(Into::into).collect(),
            managers: d.managers.into_iter().map(Into::into).collect(),
            manager_names,
            created_at: dept.created_at,
            updated_at: dept.updated_at,
        }
    }
}

/// Department row without roster, returned by the status toggle
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummaryDto {
    pub id: i32,
    pub name: String,
    pub status: DepartmentStatus,
    pub updated_at: DateTime<Utc>,
}

impl From<Department> for DepartmentSummaryDto {
    fn from(d: Department) -> Self {
        Self {
            id: d.id,
            name: d.name,
            status: d.status,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentRequest {
    pub name: String,
    #[serde(default)]
    pub manager_ids: Vec<i32>,
    #[serde(default)]
    pub employee_ids: Vec<i32>,
}

impl From<CreateDepartmentRequest> for CreateDepartmentDto {
    fn from(r: CreateDepartmentRequest) -> Self {
        Self {
            name: r.name,
            manager_ids: r.manager_ids,
            employee_ids: r.employee_ids,
        }
    }
}

/// Rename and replace the manager set.
///
/// `removalIds` lists users to take off the roster (used after confirming
/// which dropped managers should leave); `employeeIds` adds members.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartmentRequest {
    pub name: String,
    #[serde(default)]
    pub manager_ids: Vec<i32>,
    #[serde(default)]
    pub removal_ids: Vec<i32>,
    #[serde(default)]
    pub employee_ids: Vec<i32>,
}

impl From<UpdateDepartmentRequest> for UpdateDepartmentDto {
    fn from(r: UpdateDepartmentRequest) -> Self {
        Self {
            name: r.name,
            manager_ids: r.manager_ids,
            removal_ids: r.removal_ids,
            employee_ids: r.employee_ids,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartmentResponse {
    pub department: DepartmentDto,
    /// Previous managers no longer in the manager set
    pub removed_managers: Vec<i32>,
    /// Removed managers still on the roster; candidates for a follow-up removal
    pub retained_members: Vec<i32>,
}

impl From<DepartmentUpdateOutcome> for UpdateDepartmentResponse {
    fn from(o: DepartmentUpdateOutcome) -> Self {
        Self {
            department: o.department.into(),
            removed_managers: o.removed_managers,
            retained_members: o.retained_members,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetStatusRequest {
    pub status: DepartmentStatus,
}
