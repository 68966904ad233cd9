use sea_orm_migration::prelude::*;

use crate::m20260301_000001_create_investors_table::Investors;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscriptions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Subscriptions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Subscriptions::InvestorId).uuid().not_null())
                    .col(ColumnDef::new(Subscriptions::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(Subscriptions::Currency).string_len(3).not_null())
                    .col(ColumnDef::new(Subscriptions::FiatAmount).decimal_len(20, 2).not_null())
                    .col(ColumnDef::new(Subscriptions::Confirmed).boolean().not_null().default(false))
                    .col(ColumnDef::new(Subscriptions::Allocated).boolean().not_null().default(false))
                    .col(ColumnDef::new(Subscriptions::CreatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                    .col(ColumnDef::new(Subscriptions::UpdatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscriptions_investor")
                            .from(Subscriptions::Table, Subscriptions::InvestorId)
                            .to(Investors::Table, Investors::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_project")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::ProjectId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subscriptions_investor")
                    .table(Subscriptions::Table)
                    .col(Subscriptions::InvestorId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Subscriptions::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Subscriptions {
    Table,
    Id,
    InvestorId,
    ProjectId,
    Currency,
    FiatAmount,
    Confirmed,
    Allocated,
    CreatedAt,
    UpdatedAt,
}
