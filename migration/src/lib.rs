pub use sea_orm_migration::prelude::*;

mod m20261018_000001_create_reference_tables;
mod m20261018_000002_create_wallets_and_histories;
mod m20261018_000003_create_referrers;
mod m20261018_000004_create_statistics;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20261018_000001_create_reference_tables::Migration),
      Box::new(m20261018_000002_create_wallets_and_histories::Migration),
      Box::new(m20261018_000003_create_referrers::Migration),
      Box::new(m20261018_000004_create_statistics::Migration),
    ]
  }
}
