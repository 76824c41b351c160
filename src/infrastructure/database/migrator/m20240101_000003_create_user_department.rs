//! Create user_department join table (member-of)

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
                    .table(UserDepartment::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserDepartment::UserId).integer().not_null())
                    .col(ColumnDef::new(UserDepartment::DepartmentId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(UserDepartment::UserId)
                            .col(UserDepartment::DepartmentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_department_user")
                            .from(UserDepartment::Table, UserDepartment::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_department_department")
                            .from(UserDepartment::Table, UserDepartment::DepartmentId)
                            .to(Departments::Table, Departments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_department_department")
                    .table(UserDepartment::Table)
                    .col(UserDepartment::DepartmentId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserDepartment::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum UserDepartment {
    Table,
    UserId,
    DepartmentId,
}
