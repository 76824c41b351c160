//! Join-table plumbing shared by the user and department repositories.
//!
//! Every helper is generic over `ConnectionTrait` so it can run on the pool
//! or inside an open `DatabaseTransaction`.

use std::collections::{BTreeMap, BTreeSet};

use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::domain::{DepartmentRef, DomainError, DomainResult, UserRef};
use crate::infrastructure::database::entities::{
    department, department_manager, user, user_department,
};

/// Which join table an edge lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Edge {
    /// user_department
    MemberOf,
    /// department_manager
    ManagerOf,
}

type Pairs = Vec<(i32, i32)>;

/// (user_id, department_id) pairs of `edge`, narrowed by user and/or department.
pub(crate) async fn load_pairs<C: ConnectionTrait>(
    conn: &C,
    edge: Edge,
    user_ids: Option<&[i32]>,
    department_ids: Option<&[i32]>,
) -> Result<Pairs, DbErr> {
    match edge {
        Edge::MemberOf => {
            let mut query = user_department::Entity::find();
            if let Some(ids) = user_ids {
                query = query.filter(user_department::Column::UserId.is_in(ids.to_vec()));
            }
            if let Some(ids) = department_ids {
                query = query.filter(user_department::Column::DepartmentId.is_in(ids.to_vec()));
            }
            Ok(query
                .all(conn)
                .await?
                .into_iter()
                .map(|m| (m.user_id, m.department_id))
                .collect())
        }
        Edge::ManagerOf => {
            let mut query = department_manager::Entity::find();
            if let Some(ids) = user_ids {
                query = query.filter(department_manager::Column::UserId.is_in(ids.to_vec()));
            }
            if let Some(ids) = department_ids {
                query =
                    query.filter(department_manager::Column::DepartmentId.is_in(ids.to_vec()));
            }
            Ok(query
                .all(conn)
                .await?
                .into_iter()
                .map(|m| (m.user_id, m.department_id))
                .collect())
        }
    }
}

/// User ids on one side of a department.
pub(crate) async fn users_of_department<C: ConnectionTrait>(
    conn: &C,
    edge: Edge,
    department_id: i32,
) -> Result<BTreeSet<i32>, DbErr> {
    Ok(load_pairs(conn, edge, None, Some(&[department_id]))
        .await?
        .into_iter()
        .map(|(user_id, _)| user_id)
        .collect())
}

/// Department ids on one side of a user.
pub(crate) async fn departments_of_user<C: ConnectionTrait>(
    conn: &C,
    edge: Edge,
    user_id: i32,
) -> Result<BTreeSet<i32>, DbErr> {
    Ok(load_pairs(conn, edge, Some(&[user_id]), None)
        .await?
        .into_iter()
        .map(|(_, department_id)| department_id)
        .collect())
}

/// Insert the given edges, skipping the ones already present.
pub(crate) async fn insert_pairs<C: ConnectionTrait>(
    conn: &C,
    edge: Edge,
    pairs: &BTreeSet<(i32, i32)>,
) -> Result<(), DbErr> {
    if pairs.is_empty() {
        return Ok(());
    }
    let user_ids: Vec<i32> = pairs.iter().map(|(u, _)| *u).collect();
    let existing: BTreeSet<(i32, i32)> = load_pairs(conn, edge, Some(&user_ids), None)
        .await?
        .into_iter()
        .collect();
    let missing: Vec<(i32, i32)> = pairs.difference(&existing).copied().collect();
    if missing.is_empty() {
        return Ok(());
    }

    match edge {
        Edge::MemberOf => {
            let rows = missing.into_iter().map(|(user_id, department_id)| {
                user_department::ActiveModel {
                    user_id: Set(user_id),
                    department_id: Set(department_id),
                }
            });
            user_department::Entity::insert_many(rows)
                .exec_without_returning(conn)
                .await?;
        }
        Edge::ManagerOf => {
            let rows = missing.into_iter().map(|(user_id, department_id)| {
                department_manager::ActiveModel {
                    user_id: Set(user_id),
                    department_id: Set(department_id),
                }
            });
            department_manager::Entity::insert_many(rows)
                .exec_without_returning(conn)
                .await?;
        }
    }
    Ok(())
}

/// Delete edges of one department; `user_ids = None` clears the department side entirely.
pub(crate) async fn delete_department_edges<C: ConnectionTrait>(
    conn: &C,
    edge: Edge,
    department_id: i32,
    user_ids: Option<&BTreeSet<i32>>,
) -> Result<u64, DbErr> {
    if matches!(user_ids, Some(ids) if ids.is_empty()) {
        return Ok(0);
    }
    let result = match edge {
        Edge::MemberOf => {
            let mut query = user_department::Entity::delete_many()
                .filter(user_department::Column::DepartmentId.eq(department_id));
            if let Some(ids) = user_ids {
                query = query.filter(
                    user_department::Column::UserId.is_in(ids.iter().copied().collect::<Vec<_>>()),
                );
            }
            query.exec(conn).await?
        }
        Edge::ManagerOf => {
            let mut query = department_manager::Entity::delete_many()
                .filter(department_manager::Column::DepartmentId.eq(department_id));
            if let Some(ids) = user_ids {
                query = query.filter(
                    department_manager::Column::UserId
                        .is_in(ids.iter().copied().collect::<Vec<_>>()),
                );
            }
            query.exec(conn).await?
        }
    };
    Ok(result.rows_affected)
}

/// Delete edges of one user; `department_ids = None` clears the user side entirely.
pub(crate) async fn delete_user_edges<C: ConnectionTrait>(
    conn: &C,
    edge: Edge,
    user_id: i32,
    department_ids: Option<&BTreeSet<i32>>,
) -> Result<u64, DbErr> {
    if matches!(department_ids, Some(ids) if ids.is_empty()) {
        return Ok(0);
    }
    let result = match edge {
        Edge::MemberOf => {
            let mut query = user_department::Entity::delete_many()
                .filter(user_department::Column::UserId.eq(user_id));
            if let Some(ids) = department_ids {
                query = query.filter(
                    user_department::Column::DepartmentId
                        .is_in(ids.iter().copied().collect::<Vec<_>>()),
                );
            }
            query.exec(conn).await?
        }
        Edge::ManagerOf => {
            let mut query = department_manager::Entity::delete_many()
                .filter(department_manager::Column::UserId.eq(user_id));
            if let Some(ids) = department_ids {
                query = query.filter(
                    department_manager::Column::DepartmentId
                        .is_in(ids.iter().copied().collect::<Vec<_>>()),
                );
            }
            query.exec(conn).await?
        }
    };
    Ok(result.rows_affected)
}

/// Fail with NotFound on the first (lowest) user id that has no row.
pub(crate) async fn ensure_users_exist<C: ConnectionTrait>(
    conn: &C,
    ids: &BTreeSet<i32>,
) -> DomainResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let found: BTreeSet<i32> = user::Entity::find()
        .select_only()
        .column(user::Column::Id)
        .filter(user::Column::Id.is_in(ids.iter().copied().collect::<Vec<_>>()))
        .into_tuple::<i32>()
        .all(conn)
        .await?
        .into_iter()
        .collect();
    match ids.difference(&found).next() {
        Some(missing) => Err(DomainError::not_found("User", "id", missing)),
        None => Ok(()),
    }
}

/// Fail with NotFound on the first (lowest) department id that has no row.
pub(crate) async fn ensure_departments_exist<C: ConnectionTrait>(
    conn: &C,
    ids: &BTreeSet<i32>,
) -> DomainResult<()> {
    if ids.is_empty() {
        return Ok(());
    }
    let found: BTreeSet<i32> = department::Entity::find()
        .select_only()
        .column(department::Column::Id)
        .filter(department::Column::Id.is_in(ids.iter().copied().collect::<Vec<_>>()))
        .into_tuple::<i32>()
        .all(conn)
        .await?
        .into_iter()
        .collect();
    match ids.difference(&found).next() {
        Some(missing) => Err(DomainError::not_found("Department", "id", missing)),
        None => Ok(()),
    }
}

pub(crate) async fn user_refs<C: ConnectionTrait>(
    conn: &C,
    ids: &BTreeSet<i32>,
) -> Result<BTreeMap<i32, UserRef>, DbErr> {
    if ids.is_empty() {
        return Ok(BTreeMap::new());
    }
    let models = user::Entity::find()
        .filter(user::Column::Id.is_in(ids.iter().copied().collect::<Vec<_>>()))
        .order_by_asc(user::Column::Id)
        .all(conn)
        .await?;
    Ok(models
        .into_iter()
        .map(|m| {
            (
                m.id,
                UserRef {
                    id: m.id,
                    first_name: m.first_name,
                    last_name: m.last_name,
                },
            )
        })
        .collect())
}

pub(crate) async fn department_refs<C: ConnectionTrait>(
    conn: &C,
    ids: &BTreeSet<i32>,
) -> Result<BTreeMap<i32, DepartmentRef>, DbErr> {
    if ids.is_empty() {
        return Ok(BTreeMap::new());
    }
    let models = department::Entity::find()
        .filter(department::Column::Id.is_in(ids.iter().copied().collect::<Vec<_>>()))
        .all(conn)
        .await?;
    Ok(models
        .into_iter()
        .map(|m| (m.id, DepartmentRef { id: m.id, name: m.name }))
        .collect())
}

/// Group pairs by one side and resolve the other side through `refs`.
pub(crate) fn group_refs<T: Clone>(
    pairs: &[(i32, i32)],
    key: impl Fn(&(i32, i32)) -> (i32, i32),
    refs: &BTreeMap<i32, T>,
) -> BTreeMap<i32, Vec<T>> {
    let mut grouped: BTreeMap<i32, BTreeSet<i32>> = BTreeMap::new();
    for pair in pairs {
        let (owner, other) = key(pair);
        grouped.entry(owner).or_default().insert(other);
    }
    grouped
        .into_iter()
        .map(|(owner, others)| {
            let resolved = others
                .into_iter()
                .filter_map(|id| refs.get(&id).cloned())
                .collect();
            (owner, resolved)
        })
        .collect()
}
