use sea_orm_migration::prelude::*;

use super::m20261018_000001_create_reference_tables::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Wallets::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Wallets::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(Wallets::UserId)
              .big_integer()
              .not_null()
              .unique_key(),
          )
          .col(
            ColumnDef::new(Wallets::Balance)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(Wallets::OtherBalance)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(Wallets::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Wallets::UpdatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_wallets_user")
              .from(Wallets::Table, Wallets::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(AffCommissionHistories::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(AffCommissionHistories::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(AffCommissionHistories::UserId)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(AffCommissionHistories::FromId).big_integer().null(),
          )
          .col(ColumnDef::new(AffCommissionHistories::FromType).string().null())
          .col(
            ColumnDef::new(AffCommissionHistories::Commission)
              .big_integer()
              .not_null(),
          )
          .col(ColumnDef::new(AffCommissionHistories::Type).string().not_null())
          .col(ColumnDef::new(AffCommissionHistories::Information).text().null())
          .col(
            ColumnDef::new(AffCommissionHistories::CreatedAt)
              .date_time()
              .not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_aff_commission_histories_user")
              .from(AffCommissionHistories::Table, AffCommissionHistories::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_aff_commission_histories_user")
          .table(AffCommissionHistories::Table)
          .col(AffCommissionHistories::UserId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(AffCommissionHistories::Table).to_owned())
      .await?;

    manager.drop_table(Table::drop().table(Wallets::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Wallets {
  Table,
  Id,
  UserId,
  Balance,
  OtherBalance,
  CreatedAt,
  UpdatedAt,
}

#[derive(DeriveIden)]
pub enum AffCommissionHistories {
  Table,
  Id,
  UserId,
  FromId,
  FromType,
  Commission,
  Type,
  Information,
  CreatedAt,
}
