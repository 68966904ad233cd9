use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Investors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Investors::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Investors::Name).string().not_null())
                    .col(ColumnDef::new(Investors::Email).string().not_null())
                    .col(ColumnDef::new(Investors::Company).string().null())
                    .col(ColumnDef::new(Investors::InvestorType).string().null())
                    .col(ColumnDef::new(Investors::WalletAddress).string().null()) // 0x + 40 hex
                    .col(ColumnDef::new(Investors::KycStatus).string().not_null().default("not_started"))
                    .col(ColumnDef::new(Investors::KycUpdatedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Investors::Notes).text().null())
                    .col(ColumnDef::new(Investors::CreatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                    .col(ColumnDef::new(Investors::UpdatedAt).timestamp_with_time_zone().not_null().default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        // Email is the natural key used by bulk import
        manager
            .create_index(
                Index::create()
                    .name("idx_investors_email")
                    .table(Investors::Table)
                    .col(Investors::Email)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_investors_kyc_status")
                    .table(Investors::Table)
                    .col(Investors::KycStatus)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Investors::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Investors {
    Table,
    Id,
    Name,
    Email,
    Company,
    InvestorType,
    WalletAddress,
    KycStatus,
    KycUpdatedAt,
    Notes,
    CreatedAt,
    UpdatedAt,
}
