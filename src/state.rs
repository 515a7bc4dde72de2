use migration::{Migrator, MigratorTrait};

use crate::{
  config::Config, entity::referrer, locks::KeyedLocks, model::Reportable,
  prelude::*, sv,
};

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
  pub stats_locks: KeyedLocks<Reportable>,
}

impl AppState {
  pub async fn new(config: Config) -> Result<Self> {
    if !referrer::set_table_name(config.referrers_table.clone()) {
      warn!("referrers table name was already set");
    }

    let db = Database::connect(config.database_url.as_str()).await?;
    Migrator::up(&db, None).await?;

    info!(
      "database ready (referrers table `{}`, cost formula {:?}, missing rate {:?})",
      referrer::table_name(),
      config.cost_formula,
      config.missing_rate
    );

    Ok(Self::with_db(db, config))
  }

  pub fn with_db(db: DatabaseConnection, config: Config) -> Self {
    Self { db, config, stats_locks: KeyedLocks::new() }
  }

  pub fn referrers(&self) -> sv::Referrer<'_> {
    sv::Referrer::new(&self.db)
  }

  pub fn commissions(&self) -> sv::Commission<'_> {
    sv::Commission::new(&self.db, self.config.missing_rate)
  }

  pub fn stats(&self) -> sv::Stats<'_> {
    sv::Stats::new(
      &self.db,
      &self.stats_locks,
      self.config.missing_rate,
      self.config.cost_formula,
    )
  }

  pub fn tracker(&self) -> sv::Tracker<'_> {
    sv::Tracker::new(
      &self.db,
      &self.stats_locks,
      self.config.missing_rate,
      self.config.cost_formula,
    )
  }

  pub fn wallets(&self) -> sv::Wallet<'_> {
    sv::Wallet::new(&self.db)
  }

  pub fn gc_locks(&self) {
    let dropped = self.stats_locks.gc();
    if dropped > 0 {
      debug!("dropped {dropped} idle statistics locks");
    }
  }
}
