use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(SellerItems::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(SellerItems::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(SellerItems::Kind).string().not_null())
          .col(
            ColumnDef::new(SellerItems::TotalView)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(SellerItems::TotalClick)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(SellerItems::TotalCost)
              .big_integer()
              .not_null()
              .default(0),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(Statistics::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Statistics::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Statistics::UserId).big_integer().null())
          .col(ColumnDef::new(Statistics::ReportableId).big_integer().not_null())
          .col(ColumnDef::new(Statistics::ReportableType).string().not_null())
          .col(ColumnDef::new(Statistics::View).big_integer().not_null())
          .col(ColumnDef::new(Statistics::Click).big_integer().not_null())
          .col(ColumnDef::new(Statistics::TotalView).big_integer().not_null())
          .col(ColumnDef::new(Statistics::TotalClick).big_integer().not_null())
          .col(ColumnDef::new(Statistics::IpAddress).string().null())
          .col(ColumnDef::new(Statistics::UserAgent).string().null())
          .col(ColumnDef::new(Statistics::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_statistics_reportable")
          .table(Statistics::Table)
          .col(Statistics::ReportableType)
          .col(Statistics::ReportableId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Statistics::Table).to_owned())
      .await?;

    manager
      .drop_table(Table::drop().table(SellerItems::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum SellerItems {
  Table,
  Id,
  Kind,
  TotalView,
  TotalClick,
  TotalCost,
}

#[derive(DeriveIden)]
pub enum Statistics {
  Table,
  Id,
  UserId,
  ReportableId,
  ReportableType,
  View,
  Click,
  TotalView,
  TotalClick,
  IpAddress,
  UserAgent,
  CreatedAt,
}
