//! Create department_manager join table (manager-of)

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users::Users;
use super::m20240101_000002_create_departments::Departments;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DepartmentManager::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DepartmentManager::UserId).integer().not_null())
                    .col(ColumnDef::new(DepartmentManager::DepartmentId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(DepartmentManager::UserId)
                            .col(DepartmentManager::DepartmentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_department_manager_user")
                            .from(DepartmentManager::Table, DepartmentManager::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_department_manager_department")
                            .from(DepartmentManager::Table, DepartmentManager::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_department_manager_department")
                    .table(DepartmentManager::Table)
                    .col(DepartmentManager::DepartmentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DepartmentManager::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum DepartmentManager {
    Table,
    UserId,
    DepartmentId,
}
