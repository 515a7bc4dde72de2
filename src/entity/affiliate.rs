use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{history, wallet};

/// Affiliate account on the payout side, addressed by its referral code.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i64,
  pub name: String,
  #[sea_orm(unique)]
  pub referral_code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_one = "wallet::Entity")]
  Wallet,
  #[sea_orm(has_many = "history::Entity")]
  Commissions,
}

impl Related<wallet::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Wallet.def()
  }
}

impl Related<history::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Commissions.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
