//! Shared test utilities for database setup

#[cfg(test)]
pub mod test_db {
  use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, DbBackend, EntityTrait,
    Schema,
  };

  use crate::entity::*;

  async fn create<E: EntityTrait>(db: &DatabaseConnection, entity: E) {
    let schema = Schema::new(DbBackend::Sqlite);
    let stmt = schema.create_table_from_entity(entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();
  }

  /// Creates an in-memory SQLite database with all required tables
  pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    create(&db, affiliate::Entity).await;
    create(&db, banner::Entity).await;
    create(&db, commission::Entity).await;
    create(&db, commission_offer::Entity).await;
    create(&db, history::Entity).await;
    create(&db, referrer::Entity).await;
    create(&db, seller_item::Entity).await;
    create(&db, site::Entity).await;
    create(&db, statistic::Entity).await;
    create(&db, wallet::Entity).await;

    db
  }
}

/// Fixture rows for the reference tables.
#[cfg(test)]
pub mod seed {
  use base64::{Engine, engine::general_purpose::STANDARD};

  use crate::{entity::*, prelude::*};

  pub async fn affiliate(
    db: &DatabaseConnection,
    id: i64,
    code: &str,
  ) -> affiliate::Model {
    affiliate::ActiveModel {
      id: Set(id),
      name: Set(format!("affiliate {id}")),
      referral_code: Set(code.into()),
    }
    .insert(db)
    .await
    .unwrap()
  }

  pub async fn banner(
    db: &DatabaseConnection,
    id: i64,
    kind: &str,
    offer_id: Option<i64>,
  ) -> banner::Model {
    banner::ActiveModel {
      id: Set(id),
      kind: Set(kind.into()),
      offer_id: Set(offer_id),
    }
    .insert(db)
    .await
    .unwrap()
  }

  pub async fn offer(db: &DatabaseConnection, id: i64, user_commission: i64) {
    commission_offer::ActiveModel {
      id: Set(id),
      commission: Set(format!("{{\"user_commission\": {user_commission}}}")),
    }
    .insert(db)
    .await
    .unwrap();
  }

  pub async fn rate(db: &DatabaseConnection, kind: &str, amount: i64) {
    commission::ActiveModel {
      id: NotSet,
      kind: Set(kind.into()),
      commission: Set(amount),
    }
    .insert(db)
    .await
    .unwrap();
  }

  /// Registers `host` for affiliate `user_id`, returns the host token.
  pub async fn site(
    db: &DatabaseConnection,
    user_id: i64,
    host: &str,
    status: SiteStatus,
    verified: bool,
  ) -> String {
    let code = STANDARD.encode(host);
    site::ActiveModel {
      id: NotSet,
      user_id: Set(user_id),
      code: Set(code.clone()),
      status: Set(status),
      verified: Set(verified),
    }
    .insert(db)
    .await
    .unwrap();
    code
  }

  pub async fn item(db: &DatabaseConnection, id: i64, kind: ItemKind) {
    seller_item::ActiveModel {
      id: Set(id),
      kind: Set(kind),
      total_view: Set(0),
      total_click: Set(0),
      total_cost: Set(0),
    }
    .insert(db)
    .await
    .unwrap();
  }
}
