//! SeaORM implementation of DepartmentRepository
//!
//! Every write runs in one transaction and leaves manager-of ⊆ member-of.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryOrder, Set, TransactionTrait,
};
use tracing::debug;

use crate::domain::department::{plan_create, plan_update, MembershipPlan};
use crate::domain::{
    CreateDepartmentDto, Department, DepartmentDetails, DepartmentRepository, DepartmentStatus,
    DepartmentUpdateOutcome, DomainError, DomainResult, UpdateDepartmentDto,
};
use crate::infrastructure::database::entities::department;

use super::relations::{
    delete_department_edges, ensure_users_exist, group_refs, insert_pairs, load_pairs,
    user_refs, users_of_department, Edge,
};

pub struct SeaOrmDepartmentRepository {
    db: DatabaseConnection,
}

impl SeaOrmDepartmentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_status_to_domain(status: department::DepartmentStatus) -> DepartmentStatus {
    match status {
        department::DepartmentStatus::Active => DepartmentStatus::Active,
        department::DepartmentStatus::Inactive => DepartmentStatus::Inactive,
    }
}

fn domain_status_to_entity(status: DepartmentStatus) -> department::DepartmentStatus {
    match status {
        DepartmentStatus::Active => department::DepartmentStatus::Active,
        DepartmentStatus::Inactive => department::DepartmentStatus::Inactive,
    }
}

fn department_model_to_domain(model: department::Model) -> Department {
    Department {
        id: model.id,
        name: model.name,
        status: entity_status_to_domain(model.status),
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

/// Attach rosters to each department with one query per join table.
async fn attach_rosters<C: ConnectionTrait>(
    conn: &C,
    models: Vec<department::Model>,
) -> DomainResult<Vec<DepartmentDetails>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    let member_pairs = load_pairs(conn, Edge::MemberOf, None, Some(&ids)).await?;
    let manager_pairs = load_pairs(conn, Edge::ManagerOf, None, Some(&ids)).await?;

    let user_ids: BTreeSet<i32> = member_pairs
        .iter()
        .chain(manager_pairs.iter())
        .map(|(u, _)| *u)
        .collect();
    let refs = user_refs(conn, &user_ids).await?;

    let by_department = |(u, d): &(i32, i32)| (*d, *u);
    let mut members = group_refs(&member_pairs, by_department, &refs);
    let mut managers = group_refs(&manager_pairs, by_department, &refs);

    Ok(models
        .into_iter()
        .map(|m| {
            let id = m.id;
            DepartmentDetails {
                department: department_model_to_domain(m),
                members: members.remove(&id).unwrap_or_default(),
                managers: managers.remove(&id).unwrap_or_default(),
            }
        })
        .collect())
}

async fn load_details<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> DomainResult<Option<DepartmentDetails>> {
    let Some(model) = department::Entity::find_by_id(id).one(conn).await? else {
        return Ok(None);
    };
    Ok(attach_rosters(conn, vec![model]).await?.pop())
}

async fn find_model<C: ConnectionTrait>(conn: &C, id: i32) -> DomainResult<department::Model> {
    department::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| DomainError::not_found("Department", "id", id))
}

/// Write a membership plan for one department.
///
/// Order matters: the manager set is replaced first, then explicit removals
/// run, then every manager and addition is (re)inserted as a member.
async fn apply_plan<C: ConnectionTrait>(
    conn: &C,
    department_id: i32,
    plan: &MembershipPlan,
) -> DomainResult<()> {
    let current_managers = users_of_department(conn, Edge::ManagerOf, department_id).await?;
    let dropped: BTreeSet<i32> = current_managers
        .difference(&plan.managers)
        .copied()
        .collect();
    delete_department_edges(conn, Edge::ManagerOf, department_id, Some(&dropped)).await?;
    let manager_pairs: BTreeSet<(i32, i32)> =
        plan.managers.iter().map(|u| (*u, department_id)).collect();
    insert_pairs(conn, Edge::ManagerOf, &manager_pairs).await?;

    delete_department_edges(
        conn,
        Edge::MemberOf,
        department_id,
        Some(&plan.members_to_remove),
    )
    .await?;
    let member_pairs: BTreeSet<(i32, i32)> = plan
        .members_to_add
        .iter()
        .map(|u| (*u, department_id))
        .collect();
    insert_pairs(conn, Edge::MemberOf, &member_pairs).await?;
    Ok(())
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl DepartmentRepository for SeaOrmDepartmentRepository {
    async fn create(&self, dto: CreateDepartmentDto) -> DomainResult<DepartmentDetails> {
        let plan = plan_create(&dto.manager_ids, &dto.employee_ids);
        let txn = self.db.begin().await?;

        ensure_users_exist(&txn, &plan.members_to_add).await?;

        let now = Utc::now();
        let model = department::ActiveModel {
            id: NotSet,
            name: Set(dto.name),
            status: Set(department::DepartmentStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        apply_plan(&txn, model.id, &plan).await?;

        let details = load_details(&txn, model.id).await?;
        txn.commit().await?;
        details.ok_or_else(|| DomainError::Storage("inserted department vanished".into()))
    }

    async fn find_details(&self, id: i32) -> DomainResult<Option<DepartmentDetails>> {
        load_details(&self.db, id).await
    }

    async fn list(&self) -> DomainResult<Vec<DepartmentDetails>> {
        let models = department::Entity::find()
            .order_by_asc(department::Column::Name)
            .order_by_asc(department::Column::Id)
            .all(&self.db)
            .await?;
        attach_rosters(&self.db, models).await
    }

    async fn update(
        &self,
        id: i32,
        dto: UpdateDepartmentDto,
    ) -> DomainResult<DepartmentUpdateOutcome> {
        let txn = self.db.begin().await?;

        let existing = find_model(&txn, id).await?;
        let referenced: BTreeSet<i32> = dto
            .manager_ids
            .iter()
            .chain(dto.employee_ids.iter())
            .copied()
            .collect();
        ensure_users_exist(&txn, &referenced).await?;

        let old_managers = users_of_department(&txn, Edge::ManagerOf, id).await?;
        let plan = plan_update(
            &old_managers,
            &dto.manager_ids,
            &dto.removal_ids,
            &dto.employee_ids,
        );

        let mut active: department::ActiveModel = existing.into();
        active.name = Set(dto.name);
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;

        apply_plan(&txn, id, &plan).await?;

        let details = load_details(&txn, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Department", "id", id))?;
        txn.commit().await?;

        debug!(
            department_id = id,
            removed_managers = plan.removed_managers.len(),
            removed_members = plan.members_to_remove.len(),
            "Department roster rewritten"
        );

        Ok(DepartmentUpdateOutcome {
            department: details,
            removed_managers: plan.removed_managers.iter().copied().collect(),
            retained_members: plan.retained_members().into_iter().collect(),
        })
    }

    async fn set_status(&self, id: i32, status: DepartmentStatus) -> DomainResult<Department> {
        let existing = find_model(&self.db, id).await?;
        let mut active: department::ActiveModel = existing.into();
        active.status = Set(domain_status_to_entity(status));
        active.updated_at = Set(Utc::now());
        let model = active.update(&self.db).await?;
        Ok(department_model_to_domain(model))
    }

    async fn delete(&self, id: i32) -> DomainResult<()> {
        let txn = self.db.begin().await?;
        find_model(&txn, id).await?;

        delete_department_edges(&txn, Edge::ManagerOf, id, None).await?;
        delete_department_edges(&txn, Edge::MemberOf, id, None).await?;
        department::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}
