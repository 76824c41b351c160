use async_trait::async_trait;

use super::{
    CreateDepartmentDto, Department, DepartmentDetails, DepartmentStatus,
    DepartmentUpdateOutcome, UpdateDepartmentDto,
};
use crate::domain::DomainResult;

/// Department side of the membership relations.
///
/// Every mutating method is one transaction; an unknown department id fails
/// with `NotFound` before anything is written.
#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn create(&self, dto: CreateDepartmentDto) -> DomainResult<DepartmentDetails>;

    async fn find_details(&self, id: i32) -> DomainResult<Option<DepartmentDetails>>;
    async fn list(&self) -> DomainResult<Vec<DepartmentDetails>>;

    async fn update(&self, id: i32, dto: UpdateDepartmentDto)
        -> DomainResult<DepartmentUpdateOutcome>;

    async fn set_status(&self, id: i32, status: DepartmentStatus) -> DomainResult<Department>;

    /// Remove the department and its membership edges. Users are kept.
    async fn delete(&self, id: i32) -> DomainResult<()>;
}
