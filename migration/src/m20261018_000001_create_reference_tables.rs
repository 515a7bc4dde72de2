use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Users::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Users::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Users::Name).string().not_null())
          .col(
            ColumnDef::new(Users::ReferralCode)
              .string()
              .not_null()
              .unique_key(),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(CommissionOffers::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(CommissionOffers::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(CommissionOffers::Commission).text().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(Banners::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Banners::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Banners::Type).string().not_null())
          .col(ColumnDef::new(Banners::OfferId).big_integer().null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_banners_offer")
              .from(Banners::Table, Banners::OfferId)
              .to(CommissionOffers::Table, CommissionOffers::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_table(
        Table::create()
          .table(Commissions::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Commissions::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(Commissions::Type)
              .string()
              .not_null()
              .unique_key(),
          )
          .col(
            ColumnDef::new(Commissions::Commission)
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
          .table(UserSites::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(UserSites::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(UserSites::UserId).big_integer().not_null())
          .col(ColumnDef::new(UserSites::Code).string().not_null().unique_key())
          .col(
            ColumnDef::new(UserSites::Status)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(
            ColumnDef::new(UserSites::Verified)
              .boolean()
              .not_null()
              .default(false),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_user_sites_user")
              .from(UserSites::Table, UserSites::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(UserSites::Table).to_owned())
      .await?;

    manager
      .drop_table(Table::drop().table(Commissions::Table).to_owned())
      .await?;

    manager
      .drop_table(Table::drop().table(Banners::Table).to_owned())
      .await?;

    manager
      .drop_table(Table::drop().table(CommissionOffers::Table).to_owned())
      .await?;

    manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Users {
  Table,
  Id,
  Name,
  ReferralCode,
}

#[derive(DeriveIden)]
pub enum CommissionOffers {
  Table,
  Id,
  Commission,
}

#[derive(DeriveIden)]
pub enum Banners {
  Table,
  Id,
  Type,
  OfferId,
}

#[derive(DeriveIden)]
pub enum Commissions {
  Table,
  Id,
  Type,
  Commission,
}

#[derive(DeriveIden)]
pub enum UserSites {
  Table,
  Id,
  UserId,
  Code,
  Status,
  Verified,
}
