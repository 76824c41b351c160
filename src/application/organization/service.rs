//! Department service
//!
//! Reads are open to any authenticated caller; every write is admin-only.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use crate::application::access::require_admin;
use crate::domain::{
    CallerIdentity, CreateDepartmentDto, Department, DepartmentDetails, DepartmentStatus,
    DepartmentUpdateOutcome, DomainError, DomainResult, RepositoryProvider, UpdateDepartmentDto,
};
use crate::shared::validate_input;

pub struct DepartmentService {
    repos: Arc<dyn RepositoryProvider>,
}

impl DepartmentService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn list(&self, _caller: &CallerIdentity) -> DomainResult<Vec<DepartmentDetails>> {
        self.repos.departments().list().await
    }

    pub async fn get(&self, _caller: &CallerIdentity, id: i32) -> DomainResult<DepartmentDetails> {
        self.repos
            .departments()
            .find_details(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Department", "id", id))
    }

    pub async fn create(
        &self,
        caller: &CallerIdentity,
        mut dto: CreateDepartmentDto,
    ) -> DomainResult<DepartmentDetails> {
        require_admin(caller, "create_department")?;
        dto.name = dto.name.trim().to_string();
        validate_input(&dto)?;

        let created = self.repos.departments().create(dto).await?;
        info!(
            actor_id = caller.id,
            department_id = created.department.id,
            managers = created.managers.len(),
            members = created.members.len(),
            "Department created"
        );
        Ok(created)
    }

    /// Rename and replace the manager set.
    ///
    /// Managers dropped from the set keep their membership unless they are
    /// also listed in `removal_ids`; the outcome reports both groups so the
    /// caller can confirm.
    pub async fn update(
        &self,
        caller: &CallerIdentity,
        id: i32,
        mut dto: UpdateDepartmentDto,
    ) -> DomainResult<DepartmentUpdateOutcome> {
        require_admin(caller, "update_department")?;
        dto.name = dto.name.trim().to_string();
        validate_input(&dto)?;

        let removals: BTreeSet<i32> = dto.removal_ids.iter().copied().collect();
        if let Some(both) = dto.employee_ids.iter().find(|id| removals.contains(id)) {
            return Err(DomainError::validation(
                "removalIds",
                format!("user {} is both added and removed", both),
            ));
        }

        let outcome = self.repos.departments().update(id, dto).await?;
        info!(
            actor_id = caller.id,
            department_id = id,
            removed_managers = ?outcome.removed_managers,
            retained_members = ?outcome.retained_members,
            "Department updated"
        );
        Ok(outcome)
    }

    pub async fn set_status(
        &self,
        caller: &CallerIdentity,
        id: i32,
        status: DepartmentStatus,
    ) -> DomainResult<Department> {
        require_admin(caller, "set_department_status")?;
        let department = self.repos.departments().set_status(id, status).await?;
        info!(
            actor_id = caller.id,
            department_id = id,
            status = status.as_str(),
            "Department status changed"
        );
        Ok(department)
    }

    pub async fn delete(&self, caller: &CallerIdentity, id: i32) -> DomainResult<()> {
        require_admin(caller, "delete_department")?;
        self.repos.departments().delete(id).await?;
        info!(actor_id = caller.id, department_id = id, "Department deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::test_support::{memory_repos, seed_user};

    struct Fixture {
        repos: Arc<dyn RepositoryProvider>,
        service: DepartmentService,
        admin: CallerIdentity,
        employee: CallerIdentity,
    }

    impl Fixture {
        async fn new() -> Self {
            let repos = memory_repos().await;
            let admin = seed_user(repos.as_ref(), "root@example.com", UserRole::Admin, "pw").await;
            let employee =
                seed_user(repos.as_ref(), "emp@example.com", UserRole::Employee, "pw").await;
            Self {
                service: DepartmentService::new(repos.clone()),
                repos,
                admin: CallerIdentity::from(&admin),
                employee: CallerIdentity::from(&employee),
            }
        }

        async fn manager(&self, email: &str) -> i32 {
            seed_user(self.repos.as_ref(), email, UserRole::Manager, "pw")
                .await
                .id
        }

        async fn create(&self, managers: Vec<i32>, employees: Vec<i32>) -> DepartmentDetails {
            self.service
                .create(
                    &self.admin,
                    CreateDepartmentDto {
                        name: "  Engineering ".into(),
                        manager_ids: managers,
                        employee_ids: employees,
                    },
                )
                .await
                .unwrap()
        }
    }

    fn update_dto(
        managers: Vec<i32>,
        removals: Vec<i32>,
        employees: Vec<i32>,
    ) -> UpdateDepartmentDto {
        UpdateDepartmentDto {
            name: "Engineering".into(),
            manager_ids: managers,
            removal_ids: removals,
            employee_ids: employees,
        }
    }

    #[tokio::test]
    async fn create_trims_name_and_adds_managers() {
        let fx = Fixture::new().await;
        let five = fx.manager("five@example.com").await;

        let created = fx.create(vec![five], vec![fx.employee.id]).await;
        assert_eq!(created.department.name, "Engineering");
        assert_eq!(created.manager_ids(), BTreeSet::from([five]));
        assert_eq!(created.member_ids(), BTreeSet::from([five, fx.employee.id]));
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let fx = Fixture::new().await;
        let err = fx
            .service
            .create(
                &fx.admin,
                CreateDepartmentDto {
                    name: "   ".into(),
                    manager_ids: vec![],
                    employee_ids: vec![],
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field, .. } if field == "name"));
    }

    #[tokio::test]
    async fn writes_are_admin_only_and_side_effect_free() {
        let fx = Fixture::new().await;
        let dept = fx.create(vec![], vec![]).await.department;
        let emp = &fx.employee;

        let denied = [
            fx.service
                .create(
                    emp,
                    CreateDepartmentDto {
                        name: "Shadow".into(),
                        manager_ids: vec![],
                        employee_ids: vec![],
                    },
                )
                .await
                .map(|_| ()),
            fx.service
                .update(emp, dept.id, update_dto(vec![emp.id], vec![], vec![]))
                .await
                .map(|_| ()),
            fx.service
                .set_status(emp, dept.id, DepartmentStatus::Inactive)
                .await
                .map(|_| ()),
            fx.service.delete(emp, dept.id).await,
        ];
        for result in denied {
            assert!(matches!(result, Err(DomainError::Forbidden(_))));
        }

        let all = fx.service.list(emp).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].department.status, DepartmentStatus::Active);
        assert!(all[0].managers.is_empty());
    }

    #[tokio::test]
    async fn update_reports_removed_managers() {
        let fx = Fixture::new().await;
        let a = fx.manager("a@example.com").await;
        let b = fx.manager("b@example.com").await;
        let dept = fx.create(vec![a, b], vec![]).await.department;

        let outcome = fx
            .service
            .update(&fx.admin, dept.id, update_dto(vec![b], vec![], vec![]))
            .await
            .unwrap();
        assert_eq!(outcome.removed_managers, vec![a]);
        assert_eq!(outcome.retained_members, vec![a]);
        assert!(outcome.department.managers_are_members());

        let outcome = fx
            .service
            .update(&fx.admin, dept.id, update_dto(vec![b], vec![a], vec![]))
            .await
            .unwrap();
        assert!(outcome.removed_managers.is_empty());
        assert_eq!(outcome.department.member_ids(), BTreeSet::from([b]));
    }

    #[tokio::test]
    async fn update_adds_employees() {
        let fx = Fixture::new().await;
        let dept = fx.create(vec![], vec![]).await.department;
        let outcome = fx
            .service
            .update(
                &fx.admin,
                dept.id,
                update_dto(vec![], vec![], vec![fx.employee.id]),
            )
            .await
            .unwrap();
        assert_eq!(outcome.department.member_ids(), BTreeSet::from([fx.employee.id]));
    }

    #[tokio::test]
    async fn contradictory_lists_are_rejected() {
        let fx = Fixture::new().await;
        let dept = fx.create(vec![], vec![]).await.department;
        let id = fx.employee.id;
        let err = fx
            .service
            .update(&fx.admin, dept.id, update_dto(vec![], vec![id], vec![id]))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field, .. } if field == "removalIds"));
    }

    #[tokio::test]
    async fn manager_subset_holds_across_update_sequences() {
        let fx = Fixture::new().await;
        let mut ids = Vec::new();
        for i in 0..4 {
            ids.push(fx.manager(&format!("m{}@example.com", i)).await);
        }
        let dept = fx.create(vec![ids[0], ids[1]], vec![ids[2]]).await.department;

        let steps = [
            (vec![ids[2]], vec![ids[0], ids[2]], vec![]),
            (vec![ids[3], ids[0]], vec![ids[1]], vec![ids[1]]),
            (vec![], vec![ids[0], ids[3]], vec![]),
            (vec![ids[1], ids[2], ids[3]], vec![ids[1], ids[2], ids[3]], vec![]),
        ];
        for (managers, removals, employees) in steps {
            let employees: Vec<i32> = employees
                .into_iter()
                .filter(|e| !removals.contains(e))
                .collect();
            let outcome = fx
                .service
                .update(&fx.admin, dept.id, update_dto(managers, removals, employees))
                .await
                .unwrap();
            assert!(outcome.department.managers_are_members());
        }
    }

    #[tokio::test]
    async fn delete_keeps_users_queryable() {
        let fx = Fixture::new().await;
        let five = fx.manager("five@example.com").await;
        let dept = fx.create(vec![five], vec![]).await.department;

        fx.service.delete(&fx.admin, dept.id).await.unwrap();
        assert!(matches!(
            fx.service.get(&fx.admin, dept.id).await,
            Err(DomainError::NotFound { .. })
        ));
        let user = fx.repos.users().find_details(five).await.unwrap().unwrap();
        assert!(user.departments.is_empty());
    }
}
