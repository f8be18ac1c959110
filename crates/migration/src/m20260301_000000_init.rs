//! Initial schema migration.
//!
//! Creates the complete schema for Libretto:
//!
//! - `accounts`: one balance-holding row per owner
//! - `entries`: recorded income/expense events

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    BalanceCents,
    CreatedAt,
}

#[derive(Iden)]
enum Entries {
    Table,
    Id,
    OwnerId,
    Title,
    Description,
    AmountCents,
    Kind,
    OccurredAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::BalanceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Accounts::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Entries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Entries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Entries::OwnerId).string().not_null())
                    .col(ColumnDef::new(Entries::Title).string().not_null())
                    .col(ColumnDef::new(Entries::Description).string().not_null())
                    .col(
                        ColumnDef::new(Entries::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Entries::Kind).string().not_null())
                    .col(ColumnDef::new(Entries::OccurredAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-entries-owner_id")
                            .from(Entries::Table, Entries::OwnerId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-entries-owner_id-occurred_at")
                    .table(Entries::Table)
                    .col(Entries::OwnerId)
                    .col(Entries::OccurredAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Entries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
