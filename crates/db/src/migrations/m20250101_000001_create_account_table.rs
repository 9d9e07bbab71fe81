//! Create account table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Account::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Account::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Account::Email).string_len(320).not_null().unique_key())
                    .col(ColumnDef::new(Account::Password).string_len(256).not_null())
                    .col(ColumnDef::new(Account::Role).string_len(16).not_null().default("student"))
                    .col(
                        ColumnDef::new(Account::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: role (fan-out looks up every student)
        manager
            .create_index(
                Index::create()
                    .name("idx_account_role")
                    .table(Account::Table)
                    .col(Account::Role)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Account::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Account {
    Table,
    Id,
    Name,
    Email,
    Password,
    Role,
    CreatedAt,
}
