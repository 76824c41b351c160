//! SeaORM implementation of UserRepository

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr,
    TransactionTrait,
};
use tracing::debug;

use crate::domain::department::reassert_user_memberships;
use crate::domain::{
    DomainError, DomainResult, NewUser, User, UserChanges, UserDetails, UserFilter,
    UserRepository, UserRole, UserStatus,
};
use crate::infrastructure::database::entities::user;

use super::relations::{
    delete_user_edges, department_refs, departments_of_user, ensure_departments_exist,
    ensure_users_exist, group_refs, insert_pairs, load_pairs, Edge,
};

pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: user::UserRole) -> UserRole {
    match role {
        user::UserRole::Admin => UserRole::Admin,
        user::UserRole::Manager => UserRole::Manager,
        user::UserRole::Employee => UserRole::Employee,
    }
}

fn domain_role_to_entity(role: UserRole) -> user::UserRole {
    match role {
        UserRole::Admin => user::UserRole::Admin,
        UserRole::Manager => user::UserRole::Manager,
        UserRole::Employee => user::UserRole::Employee,
    }
}

fn entity_status_to_domain(status: user::UserStatus) -> UserStatus {
    match status {
        user::UserStatus::Active => UserStatus::Active,
        user::UserStatus::Inactive => UserStatus::Inactive,
    }
}

fn domain_status_to_entity(status: UserStatus) -> user::UserStatus {
    match status {
        UserStatus::Active => user::UserStatus::Active,
        UserStatus::Inactive => user::UserStatus::Inactive,
    }
}

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        email: model.email,
        password_hash: model.password_hash,
        role: entity_role_to_domain(model.role),
        status: entity_status_to_domain(model.status),
        telephone: model.telephone,
        manager_id: model.manager_id,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn unique_to_conflict(e: sea_orm::DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            DomainError::Conflict("Email already in use".to_string())
        }
        _ => e.into(),
    }
}

/// Attach member-of and manager-of department refs to each user, one
/// query per table regardless of how many users are given.
async fn attach_departments<C: ConnectionTrait>(
    conn: &C,
    models: Vec<user::Model>,
) -> DomainResult<Vec<UserDetails>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    let member_pairs = load_pairs(conn, Edge::MemberOf, Some(&ids), None).await?;
    let manager_pairs = load_pairs(conn, Edge::ManagerOf, Some(&ids), None).await?;

    let department_ids: BTreeSet<i32> = member_pairs
        .iter()
        .chain(manager_pairs.iter())
        .map(|(_, d)| *d)
        .collect();
    let refs = department_refs(conn, &department_ids).await?;

    let mut members = group_refs(&member_pairs, |p| *p, &refs);
    let mut managed = group_refs(&manager_pairs, |p| *p, &refs);

    Ok(models
        .into_iter()
        .map(|m| {
            let id = m.id;
            UserDetails {
                user: user_model_to_domain(m),
                departments: members.remove(&id).unwrap_or_default(),
                managed_departments: managed.remove(&id).unwrap_or_default(),
            }
        })
        .collect())
}

async fn load_details<C: ConnectionTrait>(conn: &C, id: i32) -> DomainResult<Option<UserDetails>> {
    let Some(model) = user::Entity::find_by_id(id).one(conn).await? else {
        return Ok(None);
    };
    Ok(attach_departments(conn, vec![model]).await?.pop())
}

async fn email_taken<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    except: Option<i32>,
) -> DomainResult<bool> {
    let mut query = user::Entity::find().filter(user::Column::Email.eq(email));
    if let Some(id) = except {
        query = query.filter(user::Column::Id.ne(id));
    }
    Ok(query.count(conn).await? > 0)
}

/// Replace a user's member-of set, keeping every department they manage.
async fn replace_memberships<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    requested: &[i32],
) -> DomainResult<()> {
    ensure_departments_exist(conn, &requested.iter().copied().collect()).await?;
    let managed = departments_of_user(conn, Edge::ManagerOf, user_id).await?;
    let target = reassert_user_memberships(requested, &managed);
    let current = departments_of_user(conn, Edge::MemberOf, user_id).await?;

    let stale: BTreeSet<i32> = current.difference(&target).copied().collect();
    delete_user_edges(conn, Edge::MemberOf, user_id, Some(&stale)).await?;
    let pairs: BTreeSet<(i32, i32)> = target.into_iter().map(|d| (user_id, d)).collect();
    insert_pairs(conn, Edge::MemberOf, &pairs).await?;
    Ok(())
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create_user(&self, new: NewUser) -> DomainResult<UserDetails> {
        let txn = self.db.begin().await?;

        if email_taken(&txn, &new.email, None).await? {
            return Err(DomainError::Conflict("Email already in use".to_string()));
        }
        if let Some(manager_id) = new.manager_id {
            ensure_users_exist(&txn, &BTreeSet::from([manager_id])).await?;
        }
        let department_ids: BTreeSet<i32> = new.department_ids.iter().copied().collect();
        ensure_departments_exist(&txn, &department_ids).await?;

        let now = Utc::now();
        let model = user::ActiveModel {
            id: NotSet,
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            email: Set(new.email),
            password_hash: Set(new.password_hash),
            role: Set(domain_role_to_entity(new.role)),
            status: Set(user::UserStatus::Active),
            telephone: Set(new.telephone),
            manager_id: Set(new.manager_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(unique_to_conflict)?;

        let pairs: BTreeSet<(i32, i32)> =
            department_ids.into_iter().map(|d| (model.id, d)).collect();
        insert_pairs(&txn, Edge::MemberOf, &pairs).await?;

        let details = attach_departments(&txn, vec![model]).await?.pop();
        txn.commit().await?;

        let details =
            details.ok_or_else(|| DomainError::Storage("inserted user vanished".into()))?;
        debug!(user_id = details.user.id, "User row created");
        Ok(details)
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(user_model_to_domain))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(user_model_to_domain))
    }

    async fn find_details(&self, id: i32) -> DomainResult<Option<UserDetails>> {
        load_details(&self.db, id).await
    }

    async fn list_users(&self, filter: UserFilter) -> DomainResult<Vec<UserDetails>> {
        let mut query = user::Entity::find();

        // Search by name or email
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(user::Column::FirstName.contains(search))
                    .add(user::Column::LastName.contains(search))
                    .add(user::Column::Email.contains(search.to_lowercase())),
            );
        }

        if let Some(role) = filter.role {
            query = query.filter(user::Column::Role.eq(domain_role_to_entity(role)));
        }

        let models = query.order_by_asc(user::Column::Id).all(&self.db).await?;
        attach_departments(&self.db, models).await
    }

    async fn list_by_role(&self, role: UserRole) -> DomainResult<Vec<User>> {
        let models = user::Entity::find()
            .filter(user::Column::Role.eq(domain_role_to_entity(role)))
            .order_by_asc(user::Column::FirstName)
            .order_by_asc(user::Column::LastName)
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(user_model_to_domain).collect())
    }

    async fn count_users(&self) -> DomainResult<u64> {
        Ok(user::Entity::find().count(&self.db).await?)
    }

    async fn update_user(&self, id: i32, changes: UserChanges) -> DomainResult<UserDetails> {
        let txn = self.db.begin().await?;

        let existing = user::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "id", id))?;

        if let Some(ref email) = changes.email {
            if email_taken(&txn, email, Some(id)).await? {
                return Err(DomainError::Conflict("Email already in use".to_string()));
            }
        }
        if let Some(Some(manager_id)) = changes.manager_id {
            ensure_users_exist(&txn, &BTreeSet::from([manager_id])).await?;
        }

        let mut active: user::ActiveModel = existing.into();
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(telephone) = changes.telephone {
            active.telephone = Set(telephone);
        }
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(role) = changes.role {
            active.role = Set(domain_role_to_entity(role));
        }
        if let Some(status) = changes.status {
            active.status = Set(domain_status_to_entity(status));
        }
        if let Some(manager_id) = changes.manager_id {
            active.manager_id = Set(manager_id);
        }
        active.updated_at = Set(Utc::now());
        active.update(&txn).await.map_err(unique_to_conflict)?;

        if let Some(ref department_ids) = changes.department_ids {
            replace_memberships(&txn, id, department_ids).await?;
        }

        let details = load_details(&txn, id).await?;
        txn.commit().await?;
        details.ok_or_else(|| DomainError::not_found("User", "id", id))
    }

    async fn update_password(&self, id: i32, password_hash: &str) -> DomainResult<()> {
        let existing = user::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("User", "id", id))?;

        let mut active: user::ActiveModel = existing.into();
        active.password_hash = Set(password_hash.to_string());
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;
        Ok(())
    }

    async fn delete_user(&self, id: i32) -> DomainResult<()> {
        let txn = self.db.begin().await?;

        if user::Entity::find_by_id(id).one(&txn).await?.is_none() {
            return Err(DomainError::not_found("User", "id", id));
        }

        // Supervised users lose their manager reference
        user::Entity::update_many()
            .col_expr(user::Column::ManagerId, Expr::value(Option::<i32>::None))
            .filter(user::Column::ManagerId.eq(id))
            .exec(&txn)
            .await?;

        delete_user_edges(&txn, Edge::ManagerOf, id, None).await?;
        delete_user_edges(&txn, Edge::MemberOf, id, None).await?;
        user::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CreateDepartmentDto, DepartmentRepository};
    use crate::infrastructure::database::repositories::SeaOrmDepartmentRepository;
    use crate::test_support::{memory_db, new_user};

    #[tokio::test]
    async fn create_and_find_by_email() {
        let repo = SeaOrmUserRepository::new(memory_db().await);
        let created = repo
            .create_user(new_user("ana@example.com", UserRole::Employee))
            .await
            .unwrap();
        assert_eq!(created.user.status, UserStatus::Active);
        assert!(created.departments.is_empty());

        let found = repo.find_by_email("ana@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.user.id);
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict_and_keeps_original() {
        let repo = SeaOrmUserRepository::new(memory_db().await);
        let first = repo
            .create_user(new_user("dup@example.com", UserRole::Manager))
            .await
            .unwrap();

        let mut second = new_user("dup@example.com", UserRole::Employee);
        second.first_name = "Other".into();
        let err = repo.create_user(second).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        assert_eq!(repo.count_users().await.unwrap(), 1);
        let kept = repo.find_by_id(first.user.id).await.unwrap().unwrap();
        assert_eq!(kept.role, UserRole::Manager);
    }

    #[tokio::test]
    async fn create_with_unknown_department_writes_nothing() {
        let repo = SeaOrmUserRepository::new(memory_db().await);
        let mut new = new_user("x@example.com", UserRole::Employee);
        new.department_ids = vec![42];
        let err = repo.create_user(new).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Department", .. }));
        assert_eq!(repo.count_users().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn department_assignment_keeps_managed_departments() {
        let db = memory_db().await;
        let users = SeaOrmUserRepository::new(db.clone());
        let departments = SeaOrmDepartmentRepository::new(db);

        let boss = users
            .create_user(new_user("boss@example.com", UserRole::Manager))
            .await
            .unwrap()
            .user;
        let sales = departments
            .create(CreateDepartmentDto {
                name: "Sales".into(),
                manager_ids: vec![boss.id],
                employee_ids: vec![],
            })
            .await
            .unwrap()
            .department;
        let ops = departments
            .create(CreateDepartmentDto {
                name: "Ops".into(),
                manager_ids: vec![],
                employee_ids: vec![],
            })
            .await
            .unwrap()
            .department;

        let updated = users
            .update_user(
                boss.id,
                UserChanges {
                    department_ids: Some(vec![ops.id]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let ids: Vec<i32> = updated.departments.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![sales.id, ops.id]);
        assert_eq!(updated.managed_departments.len(), 1);
    }

    #[tokio::test]
    async fn delete_clears_edges_and_supervisor_reference() {
        let db = memory_db().await;
        let users = SeaOrmUserRepository::new(db.clone());
        let departments = SeaOrmDepartmentRepository::new(db);

        let boss = users
            .create_user(new_user("boss@example.com", UserRole::Manager))
            .await
            .unwrap()
            .user;
        let mut report = new_user("report@example.com", UserRole::Employee);
        report.manager_id = Some(boss.id);
        let report = users.create_user(report).await.unwrap().user;

        let dept = departments
            .create(CreateDepartmentDto {
                name: "Support".into(),
                manager_ids: vec![boss.id],
                employee_ids: vec![report.id],
            })
            .await
            .unwrap()
            .department;

        users.delete_user(boss.id).await.unwrap();

        assert!(users.find_by_id(boss.id).await.unwrap().is_none());
        let report = users.find_by_id(report.id).await.unwrap().unwrap();
        assert_eq!(report.manager_id, None);

        let roster = departments.find_details(dept.id).await.unwrap().unwrap();
        assert!(roster.managers.is_empty());
        assert_eq!(roster.member_ids(), BTreeSet::from([report.id]));
    }

    #[tokio::test]
    async fn search_and_role_filter() {
        let repo = SeaOrmUserRepository::new(memory_db().await);
        repo.create_user(new_user("ana@example.com", UserRole::Manager))
            .await
            .unwrap();
        repo.create_user(new_user("bob@example.com", UserRole::Employee))
            .await
            .unwrap();

        let managers = repo
            .list_users(UserFilter {
                role: Some(UserRole::Manager),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(managers.len(), 1);

        let bobs = repo
            .list_users(UserFilter {
                search: Some("BOB@".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].user.email, "bob@example.com");
    }

    #[tokio::test]
    async fn missing_user_update_is_not_found() {
        let repo = SeaOrmUserRepository::new(memory_db().await);
        let err = repo
            .update_user(7, UserChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "User", .. }));
        assert!(matches!(
            repo.delete_user(7).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
