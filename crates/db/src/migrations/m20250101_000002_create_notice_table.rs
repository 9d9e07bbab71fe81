//! Create notice table.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_account_table::Account;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notice::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Notice::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Notice::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Notice::Description).text().not_null())
                    .col(ColumnDef::new(Notice::Category).string_len(64).not_null())
                    .col(ColumnDef::new(Notice::AttachmentUrl).string_len(1024))
                    .col(
                        ColumnDef::new(Notice::PublishAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Notice::IsPublished).boolean().not_null().default(false))
                    .col(ColumnDef::new(Notice::CreatedBy).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Notice::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notice_created_by")
                            .from(Notice::Table, Notice::CreatedBy)
                            .to(Account::Table, Account::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (is_published, publish_at) serves both the sweep and the public listing
        manager
            .create_index(
                Index::create()
                    .name("idx_notice_is_published_publish_at")
                    .table(Notice::Table)
                    .col(Notice::IsPublished)
                    .col(Notice::PublishAt)
                    .to_owned(),
            )
            .await?;

        // Index: created_by
        manager
            .create_index(
                Index::create()
                    .name("idx_notice_created_by")
                    .table(Notice::Table)
                    .col(Notice::CreatedBy)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notice::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Notice {
    Table,
    Id,
    Title,
    Description,
    Category,
    AttachmentUrl,
    PublishAt,
    IsPublished,
    CreatedBy,
    CreatedAt,
}
