use sea_orm::sea_query::{Expr, OnConflict};

use crate::{entity::wallet, prelude::*};

/// Affiliate wallets. Works on a plain connection or inside a transaction.
pub struct Wallet<'a, C = DatabaseConnection> {
  db: &'a C,
}

impl<'a, C: ConnectionTrait> Wallet<'a, C> {
  pub fn new(db: &'a C) -> Self {
    Self { db }
  }

  pub async fn by_user(&self, user_id: i64) -> Result<Option<wallet::Model>> {
    Ok(
      wallet::Entity::find()
        .filter(wallet::Column::UserId.eq(user_id))
        .one(self.db)
        .await?,
    )
  }

  pub async fn find_or_create(&self, user_id: i64) -> Result<wallet::Model> {
    let now = Utc::now().naive_utc();

    wallet::Entity::insert(wallet::ActiveModel {
      id: NotSet,
      user_id: Set(user_id),
      balance: Set(0),
      other_balance: Set(0),
      created_at: Set(now),
      updated_at: Set(now),
    })
    .on_conflict(
      OnConflict::column(wallet::Column::UserId).do_nothing().to_owned(),
    )
    .exec_without_returning(self.db)
    .await?;

    self.by_user(user_id).await?.ok_or_else(|| {
      Error::Internal(format!("wallet of user {user_id} vanished"))
    })
  }

  /// Adds `amount` to the balance in a single statement,
  /// creating the wallet first if needed.
  pub async fn credit(&self, user_id: i64, amount: i64) -> Result<wallet::Model> {
    if amount < 0 {
      return Err(Error::InvalidArgs("Credit amount must not be negative".into()));
    }

    self.find_or_create(user_id).await?;

    wallet::Entity::update_many()
      .col_expr(
        wallet::Column::Balance,
        Expr::col(wallet::Column::Balance).add(amount),
      )
      .col_expr(wallet::Column::UpdatedAt, Expr::value(Utc::now().naive_utc()))
      .filter(wallet::Column::UserId.eq(user_id))
      .exec(self.db)
      .await?;

    self.by_user(user_id).await?.ok_or_else(|| {
      Error::Internal(format!("wallet of user {user_id} vanished"))
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils::{seed, test_db};

  async fn setup() -> DatabaseConnection {
    let db = test_db::setup().await;
    seed::affiliate(&db, 9, "AFF9").await;
    db
  }

  #[tokio::test]
  async fn test_find_or_create_is_lazy_and_unique() {
    let db = setup().await;
    let wallets = Wallet::new(&db);

    assert!(wallets.by_user(9).await.unwrap().is_none());

    let created = wallets.find_or_create(9).await.unwrap();
    assert_eq!(created.balance, 0);
    assert_eq!(created.other_balance, 0);

    let again = wallets.find_or_create(9).await.unwrap();
    assert_eq!(again.id, created.id);
    assert_eq!(wallet::Entity::find().all(&db).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_credit_accumulates() {
    let db = setup().await;
    let wallets = Wallet::new(&db);

    assert_eq!(wallets.credit(9, 50).await.unwrap().balance, 50);
    assert_eq!(wallets.credit(9, 25).await.unwrap().balance, 75);
    assert_eq!(wallets.credit(9, 0).await.unwrap().balance, 75);
  }

  #[tokio::test]
  async fn test_credit_rejects_negative() {
    let db = setup().await;

    let result = Wallet::new(&db).credit(9, -1).await;
    assert!(matches!(result, Err(Error::InvalidArgs(_))));
    assert!(Wallet::new(&db).by_user(9).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_credit_inside_rolled_back_transaction() {
    let db = setup().await;

    let txn = db.begin().await.unwrap();
    Wallet::new(&txn).credit(9, 50).await.unwrap();
    txn.rollback().await.unwrap();

    assert!(Wallet::new(&db).by_user(9).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_concurrent_credits_are_not_lost() {
    let db = setup().await;

    let tasks = (0..16).map(|_| {
      let db = &db;
      async move { Wallet::new(db).credit(9, 5).await.unwrap() }
    });
    futures::future::join_all(tasks).await;

    let wallet = Wallet::new(&db).by_user(9).await.unwrap().unwrap();
    assert_eq!(wallet.balance, 5 * 16);
    assert_eq!(wallet::Entity::find().all(&db).await.unwrap().len(), 1);
  }
}
