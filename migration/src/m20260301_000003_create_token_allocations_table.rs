use sea_orm_migration::prelude::*;

use crate::m20260301_000001_create_investors_table::Investors;
use crate::m20260301_000002_create_subscriptions_table::Subscriptions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TokenAllocations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TokenAllocations::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(TokenAllocations::SubscriptionId).uuid().not_null())
                    .col(ColumnDef::new(TokenAllocations::InvestorId).uuid().not_null())
                    .col(ColumnDef::new(TokenAllocations::ProjectId).uuid().not_null())
                    .col(ColumnDef::new(TokenAllocations::TokenType).string().not_null()) // ERC-20 .. ERC-4626
                    .col(ColumnDef::new(TokenAllocations::TokenAmount).decimal_len(38, 8).not_null())
                    .col(ColumnDef::new(TokenAllocations::AllocationDate).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(TokenAllocations::Minted).boolean().not_null().default(false))
                    .col(ColumnDef::new(TokenAllocations::MintingDate).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(TokenAllocations::MintingTxHash).string().null())
                    .col(ColumnDef::new(TokenAllocations::Distributed).boolean().not_null().default(false))
                    .col(ColumnDef::new(TokenAllocations::DistributionDate).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(TokenAllocations::DistributionTxHash).string().null())
                    .col(ColumnDef::new(TokenAllocations::Notes).text().null())
                    .col(ColumnDef::new(TokenAllocations::CreatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                    .col(ColumnDef::new(TokenAllocations::UpdatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_token_allocations_subscription")
                            .from(TokenAllocations::Table, TokenAllocations::SubscriptionId)
                            .to(Subscriptions::Table, Subscriptions::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_token_allocations_investor")
                            .from(TokenAllocations::Table, TokenAllocations::InvestorId)
                            .to(Investors::Table, Investors::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // Minting groups by project and token type
        manager
            .create_index(
                Index::create()
                    .name("idx_token_allocations_project_type")
                    .table(TokenAllocations::Table)
                    .col(TokenAllocations::ProjectId)
                    .col(TokenAllocations::TokenType)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_token_allocations_subscription")
                    .table(TokenAllocations::Table)
                    .col(TokenAllocations::SubscriptionId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_token_allocations_allocation_date")
                    .table(TokenAllocations::Table)
                    .col(TokenAllocations::AllocationDate)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TokenAllocations::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum TokenAllocations {
    Table,
    Id,
    SubscriptionId,
    InvestorId,
    ProjectId,
    TokenType,
    TokenAmount,
    AllocationDate,
    Minted,
    MintingDate,
    MintingTxHash,
    Distributed,
    DistributionDate,
    DistributionTxHash,
    Notes,
    CreatedAt,
    UpdatedAt,
}
