use sea_orm_migration::prelude::*;

/// Must match the name the service is configured with.
fn table() -> Alias {
  let name = std::env::var("AFFILIATE_REFERRERS_TABLE")
    .ok()
    .map(|name| name.trim().to_string())
    .filter(|name| !name.is_empty())
    .unwrap_or_else(|| "referrers".into());
  Alias::new(name)
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(table())
          .if_not_exists()
          .col(
            ColumnDef::new(Referrers::Id)
              .big_integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Referrers::UserId).big_integer().not_null())
          .col(ColumnDef::new(Referrers::UserType).string().not_null())
          .col(ColumnDef::new(Referrers::Referrer).string().null())
          .col(ColumnDef::new(Referrers::Host).string().null())
          .col(ColumnDef::new(Referrers::Commission).big_integer().null())
          .col(ColumnDef::new(Referrers::Info).text().null())
          .col(ColumnDef::new(Referrers::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_referrers_owner")
          .table(table())
          .col(Referrers::UserType)
          .col(Referrers::UserId)
          .unique()
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(table()).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Referrers {
  Id,
  UserId,
  UserType,
  Referrer,
  Host,
  Commission,
  Info,
  CreatedAt,
}
