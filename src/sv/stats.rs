use sea_orm::sea_query::Expr;

use crate::{
  config::{CostFormula, MissingRate},
  entity::{ItemKind, seller_item, statistic},
  locks::KeyedLocks,
  model::{Client, Event, Outcome, Reportable, Skip},
  prelude::*,
  sv::{Commission, Lookup},
};

/// View/click counters of banners and seller items.
pub struct Stats<'a> {
  db: &'a DatabaseConnection,
  locks: &'a KeyedLocks<Reportable>,
  missing_rate: MissingRate,
  formula: CostFormula,
}

impl<'a> Stats<'a> {
  pub fn new(
    db: &'a DatabaseConnection,
    locks: &'a KeyedLocks<Reportable>,
    missing_rate: MissingRate,
    formula: CostFormula,
  ) -> Self {
    Self { db, locks, missing_rate, formula }
  }

  pub async fn latest(
    &self,
    target: Reportable,
  ) -> Result<Option<statistic::Model>> {
    latest(self.db, target).await
  }

  /// Records `events` against `target`.
  ///
  /// Seller items are billed first. With `total_only` only the raw click
  /// total of the latest row is bumped, otherwise a new row is appended
  /// carrying the previous counters plus `events`.
  pub async fn increment(
    &self,
    target: Reportable,
    payee_code: Option<&str>,
    events: &[Event],
    total_only: bool,
    client: &Client,
  ) -> Result<Outcome<statistic::Model>> {
    let payee = match payee_code {
      Some(code) => Lookup::new(self.db).affiliate(code).await?,
      None => None,
    };
    let payee_id = payee.map(|payee| payee.id);

    let _guard = self.locks.lock(&target).await;

    if let Some(kind) = target.kind.item() {
      for &event in events {
        if self.accrue_cost(target.id, kind, event).await?.is_none() {
          debug!("{kind} {} not found", target.id);
          return Ok(Outcome::Skipped(Skip::ItemNotFound));
        }
      }
    }

    let row = if total_only {
      self.bump_total_click(target, payee_id, client).await?
    } else {
      self.append(target, payee_id, events, client).await?
    };

    Ok(Outcome::Done(row))
  }

  /// Bills one impression of a seller item and recomputes its total cost.
  /// Must run under the item lock.
  async fn accrue_cost(
    &self,
    item_id: i64,
    kind: ItemKind,
    event: Event,
  ) -> Result<Option<seller_item::Model>> {
    if seller_item::Entity::find_by_id(item_id).one(self.db).await?.is_none() {
      return Ok(None);
    }

    let commission = Commission::new(self.db, self.missing_rate);
    let rate = commission.rate(&format!("{kind}-{}", event.as_str())).await?;

    let (click_rate, view_rate) = match self.formula {
      CostFormula::Legacy => (rate, rate),
      CostFormula::Split => match event {
        Event::Click => (rate, commission.rate(&format!("{kind}-view")).await?),
        Event::View => (commission.rate(&format!("{kind}-click")).await?, rate),
      },
    };

    let counter = match event {
      Event::Click => seller_item::Column::TotalClick,
      Event::View => seller_item::Column::TotalView,
    };

    seller_item::Entity::update_many()
      .col_expr(counter, Expr::col(counter).add(1))
      .filter(seller_item::Column::Id.eq(item_id))
      .exec(self.db)
      .await?;

    seller_item::Entity::update_many()
      .col_expr(
        seller_item::Column::TotalCost,
        Expr::col(seller_item::Column::TotalClick)
          .mul(click_rate)
          .add(Expr::col(seller_item::Column::TotalView).mul(view_rate)),
      )
      .filter(seller_item::Column::Id.eq(item_id))
      .exec(self.db)
      .await?;

    Ok(seller_item::Entity::find_by_id(item_id).one(self.db).await?)
  }

  async fn bump_total_click(
    &self,
    target: Reportable,
    payee_id: Option<i64>,
    client: &Client,
  ) -> Result<statistic::Model> {
    let Some(row) = self.latest(target).await? else {
      return insert(self.db, target, payee_id, Counters::seed(), client).await;
    };

    statistic::Entity::update_many()
      .col_expr(
        statistic::Column::TotalClick,
        Expr::col(statistic::Column::TotalClick).add(1),
      )
      .filter(statistic::Column::Id.eq(row.id))
      .exec(self.db)
      .await?;

    statistic::Entity::find_by_id(row.id).one(self.db).await?.ok_or_else(|| {
      Error::Internal(format!("statistics row {} vanished", row.id))
    })
  }

  async fn append(
    &self,
    target: Reportable,
    payee_id: Option<i64>,
    events: &[Event],
    client: &Client,
  ) -> Result<statistic::Model> {
    let txn = self.db.begin().await?;

    let mut counters = latest(&txn, target)
      .await?
      .map(|row| Counters::from(&row))
      .unwrap_or_default();
    for &event in events {
      counters.record(event);
    }

    let row = insert(&txn, target, payee_id, counters, client).await?;
    txn.commit().await?;
    Ok(row)
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Counters {
  view: i64,
  click: i64,
  total_view: i64,
  total_click: i64,
}

impl Counters {
  /// First row of an item that so far only saw raw clicks.
  fn seed() -> Self {
    Self { total_click: 1, ..Default::default() }
  }

  fn record(&mut self, event: Event) {
    match event {
      Event::View => {
        self.view += 1;
        self.total_view += 1;
      }
      Event::Click => {
        self.click += 1;
        self.total_click += 1;
      }
    }
  }
}

impl From<&statistic::Model> for Counters {
  fn from(row: &statistic::Model) -> Self {
    Self {
      view: row.view,
      click: row.click,
      total_view: row.total_view,
      total_click: row.total_click,
    }
  }
}

async fn latest<C: ConnectionTrait>(
  db: &C,
  target: Reportable,
) -> Result<Option<statistic::Model>> {
  Ok(
    statistic::Entity::find()
      .filter(statistic::Column::ReportableType.eq(target.kind))
      .filter(statistic::Column::ReportableId.eq(target.id))
      .order_by_desc(statistic::Column::Id)
      .one(db)
      .await?,
  )
}

async fn insert<C: ConnectionTrait>(
  db: &C,
  target: Reportable,
  payee_id: Option<i64>,
  counters: Counters,
  client: &Client,
) -> Result<statistic::Model> {
  Ok(
    statistic::ActiveModel {
      id: NotSet,
      user_id: Set(payee_id),
      reportable_id: Set(target.id),
      reportable_type: Set(target.kind),
      view: Set(counters.view),
      click: Set(counters.click),
      total_view: Set(counters.total_view),
      total_click: Set(counters.total_click),
      ip_address: Set(client.ip_address.clone()),
      user_agent: Set(client.user_agent.clone()),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(db)
    .await?,
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entity::ReportableKind,
    sv::test_utils::{seed, test_db},
  };

  fn product(id: i64) -> Reportable {
    Reportable { kind: ReportableKind::Product, id }
  }

  fn client() -> Client {
    Client {
      ip_address: Some("203.0.113.9".into()),
      user_agent: Some("test-agent".into()),
    }
  }

  async fn item(db: &DatabaseConnection, id: i64) -> seller_item::Model {
    seller_item::Entity::find_by_id(id).one(db).await.unwrap().unwrap()
  }

  #[tokio::test]
  async fn test_append_seeds_from_latest_row() {
    let db = test_db::setup().await;
    seed::affiliate(&db, 1, "AFF1").await;
    let locks = KeyedLocks::new();
    let stats =
      Stats::new(&db, &locks, MissingRate::Zero, CostFormula::Legacy);
    let banner = Reportable::banner(7);

    let both = [Event::View, Event::Click];
    stats.increment(banner, Some("AFF1"), &both, false, &client()).await.unwrap();
    let row = stats
      .increment(banner, Some("AFF1"), &both, false, &client())
      .await
      .unwrap()
      .done()
      .unwrap();

    assert_eq!((row.view, row.click), (2, 2));
    assert_eq!((row.total_view, row.total_click), (2, 2));
    assert_eq!(row.user_id, Some(1));
    assert_eq!(row.ip_address.as_deref(), Some("203.0.113.9"));
    assert_eq!(statistic::Entity::find().all(&db).await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn test_total_only_bumps_latest_row() {
    let db = test_db::setup().await;
    let locks = KeyedLocks::new();
    let stats =
      Stats::new(&db, &locks, MissingRate::Zero, CostFormula::Legacy);
    let banner = Reportable::banner(7);

    let first = stats
      .increment(banner, None, &[Event::Click], true, &client())
      .await
      .unwrap()
      .done()
      .unwrap();
    assert_eq!((first.click, first.total_click), (0, 1));
    assert_eq!(first.user_id, None);

    let again = stats
      .increment(banner, None, &[Event::Click], true, &client())
      .await
      .unwrap()
      .done()
      .unwrap();
    assert_eq!(again.id, first.id);
    assert_eq!(again.total_click, 2);

    let fresh = stats
      .increment(banner, None, &[Event::View, Event::Click], false, &client())
      .await
      .unwrap()
      .done()
      .unwrap();
    assert_eq!((fresh.click, fresh.total_click), (1, 3));
    assert_eq!((fresh.view, fresh.total_view), (1, 1));
  }

  #[tokio::test]
  async fn test_rows_are_kept_per_item() {
    let db = test_db::setup().await;
    seed::item(&db, 7, ItemKind::Product).await;
    let locks = KeyedLocks::new();
    let stats =
      Stats::new(&db, &locks, MissingRate::Zero, CostFormula::Legacy);

    stats
      .increment(Reportable::banner(7), None, &[Event::View], false, &client())
      .await
      .unwrap();
    let row = stats
      .increment(product(7), None, &[Event::View], false, &client())
      .await
      .unwrap()
      .done()
      .unwrap();

    assert_eq!(row.total_view, 1);
    assert_eq!(row.reportable_type, ReportableKind::Product);
  }

  #[tokio::test]
  async fn test_legacy_cost_uses_current_rate_for_both_totals() {
    let db = test_db::setup().await;
    seed::item(&db, 3, ItemKind::Product).await;
    seed::rate(&db, "product-click", 10).await;
    seed::rate(&db, "product-view", 1).await;
    let locks = KeyedLocks::new();
    let stats =
      Stats::new(&db, &locks, MissingRate::Fail, CostFormula::Legacy);

    stats
      .increment(product(3), None, &[Event::View], false, &client())
      .await
      .unwrap();
    let billed = item(&db, 3).await;
    assert_eq!((billed.total_view, billed.total_click), (1, 0));
    assert_eq!(billed.total_cost, 1);

    stats
      .increment(product(3), None, &[Event::Click], false, &client())
      .await
      .unwrap();
    let billed = item(&db, 3).await;
    assert_eq!((billed.total_view, billed.total_click), (1, 1));
    // both totals priced at the click rate
    assert_eq!(billed.total_cost, 20);
  }

  #[tokio::test]
  async fn test_split_cost_prices_each_total() {
    let db = test_db::setup().await;
    seed::item(&db, 3, ItemKind::Service).await;
    seed::rate(&db, "service-click", 10).await;
    seed::rate(&db, "service-view", 1).await;
    let locks = KeyedLocks::new();
    let stats = Stats::new(&db, &locks, MissingRate::Fail, CostFormula::Split);
    let service = Reportable { kind: ReportableKind::Service, id: 3 };

    stats
      .increment(service, None, &[Event::View], false, &client())
      .await
      .unwrap();
    stats
      .increment(service, None, &[Event::Click], false, &client())
      .await
      .unwrap();

    let billed = item(&db, 3).await;
    assert_eq!(billed.total_cost, 11);
  }

  #[tokio::test]
  async fn test_unknown_item_is_skipped() {
    let db = test_db::setup().await;
    let locks = KeyedLocks::new();
    let stats =
      Stats::new(&db, &locks, MissingRate::Zero, CostFormula::Legacy);

    let outcome = stats
      .increment(product(99), None, &[Event::Click], false, &client())
      .await
      .unwrap();

    assert_eq!(outcome.skipped(), Some(Skip::ItemNotFound));
    assert!(statistic::Entity::find().all(&db).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_concurrent_appends_do_not_lose_counts() {
    let db = test_db::setup().await;
    let locks = KeyedLocks::new();
    let banner = Reportable::banner(7);

    let tasks = (0..8).map(|_| {
      let (db, locks) = (&db, &locks);
      async move {
        Stats::new(db, locks, MissingRate::Zero, CostFormula::Legacy)
          .increment(banner, None, &[Event::Click], false, &Client::default())
          .await
          .unwrap();
      }
    });
    futures::future::join_all(tasks).await;

    let stats =
      Stats::new(&db, &locks, MissingRate::Zero, CostFormula::Legacy);
    let latest = stats.latest(banner).await.unwrap().unwrap();
    assert_eq!(latest.click, 8);
    assert_eq!(latest.total_click, 8);
  }
}
